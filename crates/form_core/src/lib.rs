//! Form enhancement layer: validation, submission and result rendering for the
//! enquiry and contact forms.

pub mod controller;
pub mod error;
pub mod form;
pub mod interpreter;
pub mod presentation;
pub mod search;
pub mod transport;
pub mod validator;

pub use controller::{FormController, FormEvent};
pub use error::{SearchError, TransportError};
pub use form::{Control, ControlKind, FieldWrapper, Form};
pub use interpreter::ResponseInterpreter;
pub use transport::{select_transport, MockTransport, NetworkTransport, SubmissionTransport};
