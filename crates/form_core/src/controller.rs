//! Per-form orchestration of validation, submission and rendering.

use std::sync::Arc;

use shared::{domain::FormDescriptor, protocol::SubmissionState};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    form::{Control, ControlKind, Form, StatusModifier},
    interpreter::ResponseInterpreter,
    presentation::{self, ERROR_MESSAGE, LOADING_MESSAGE},
    transport::SubmissionTransport,
    validator,
};

const STATE_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// A new value was typed into a field.
    Input { field: String, value: String },
    /// A checkbox was toggled.
    Check { field: String, checked: bool },
    Submit,
}

struct ControllerState {
    form: Form,
    state: SubmissionState,
}

/// Releases the submit control if the submission future is dropped before the
/// transport settles.
struct InFlight {
    inner: Arc<Mutex<ControllerState>>,
    states: broadcast::Sender<SubmissionState>,
    armed: bool,
}

impl InFlight {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!("submission abandoned before the transport settled");
        let states = self.states.clone();
        let abandon = move |state: &mut ControllerState| {
            state.form.submit.release();
            state.state = SubmissionState::Idle;
            let _ = states.send(SubmissionState::Idle);
        };

        if let Ok(mut guard) = self.inner.try_lock() {
            abandon(&mut guard);
            return;
        }
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let inner = Arc::clone(&self.inner);
            handle.spawn(async move { abandon(&mut *inner.lock().await) });
        }
    }
}

/// Drives one enhanced form.
///
/// The form lock is released while the transport is in flight, so input and
/// further submit events interleave at that point. The disabled submit control
/// is what rejects a second submission.
pub struct FormController {
    inner: Arc<Mutex<ControllerState>>,
    descriptor: FormDescriptor,
    transport: Arc<dyn SubmissionTransport>,
    interpreter: ResponseInterpreter,
    states: broadcast::Sender<SubmissionState>,
}

impl FormController {
    pub fn new(mut form: Form, transport: Arc<dyn SubmissionTransport>) -> Self {
        form.novalidate = true;
        let (states, _) = broadcast::channel(STATE_CHANNEL_CAPACITY);
        Self {
            descriptor: form.descriptor.clone(),
            inner: Arc::new(Mutex::new(ControllerState {
                form,
                state: SubmissionState::Idle,
            })),
            transport,
            interpreter: ResponseInterpreter::default(),
            states,
        }
    }

    pub fn with_interpreter(mut self, interpreter: ResponseInterpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SubmissionState> {
        self.states.subscribe()
    }

    pub async fn state(&self) -> SubmissionState {
        self.inner.lock().await.state
    }

    /// Copy of the current form state.
    pub async fn snapshot(&self) -> Form {
        self.inner.lock().await.form.clone()
    }

    pub async fn dispatch(&self, event: FormEvent) {
        match event {
            FormEvent::Input { field, value } => {
                self.on_field_change(&field, |control| control.set_value(value))
                    .await
            }
            FormEvent::Check { field, checked } => {
                self.on_field_change(&field, |control| {
                    if control.kind == ControlKind::Checkbox {
                        control.checked = checked;
                    }
                })
                .await
            }
            FormEvent::Submit => self.on_submit().await,
        }
    }

    async fn on_field_change(&self, field: &str, apply: impl FnOnce(&mut Control)) {
        let mut guard = self.inner.lock().await;
        let Some(wrapper) = guard.form.field_mut(field) else {
            debug!(field, "input event for unknown field");
            return;
        };
        apply(&mut wrapper.control);
        validator::clear_field_error(wrapper);
    }

    async fn on_submit(&self) {
        let payload = {
            let mut guard = self.inner.lock().await;
            if guard.form.submit.disabled {
                debug!("submission already in flight; ignoring submit");
                return;
            }

            self.transition(&mut guard, SubmissionState::Validating);
            let invalid = validator::validate_form(&mut guard.form);
            if let Some(&first) = invalid.first() {
                guard.form.focus(first);
                debug!(invalid = invalid.len(), "form has invalid fields");
                self.transition(&mut guard, SubmissionState::Idle);
                return;
            }

            let form = &mut guard.form;
            let payload = form.payload();
            presentation::set_status(form.status.as_mut(), StatusModifier::Loading, LOADING_MESSAGE);
            presentation::clear_outputs(form);
            form.submit.engage();
            self.transition(&mut guard, SubmissionState::Submitting);
            payload
        };

        let in_flight = InFlight {
            inner: Arc::clone(&self.inner),
            states: self.states.clone(),
            armed: true,
        };
        let descriptor = &self.descriptor;
        let result = self.transport.submit(descriptor, &payload).await;

        let mut guard = self.inner.lock().await;
        match result {
            Ok(response) => {
                let outcome = self.interpreter.interpret(descriptor, &response, &payload);
                presentation::render_success(&mut guard.form, &outcome);
                guard.form.reset();
                info!(purpose = descriptor.purpose.as_str(), "form submitted");
                self.transition(&mut guard, SubmissionState::Success);
            }
            Err(err) => {
                error!(error = %err, purpose = descriptor.purpose.as_str(), "form submission failed");
                presentation::set_status(
                    guard.form.status.as_mut(),
                    StatusModifier::Error,
                    ERROR_MESSAGE,
                );
                self.transition(&mut guard, SubmissionState::Error);
            }
        }
        guard.form.submit.release();
        self.transition(&mut guard, SubmissionState::Idle);
        in_flight.disarm();
    }

    fn transition(&self, guard: &mut ControllerState, next: SubmissionState) {
        guard.state = next;
        // No subscribers is fine.
        let _ = self.states.send(next);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
