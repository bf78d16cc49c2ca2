use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use shared::{
    domain::{FormPurpose, Payload},
    protocol::TransportResponse,
};
use tokio::sync::Notify;

use crate::{
    error::TransportError,
    form::FieldWrapper,
    presentation::SUCCESS_MESSAGE,
    transport::{MockSubmissionTransport, MockTransport},
};

fn enquiry_form() -> Form {
    let descriptor = FormDescriptor {
        purpose: FormPurpose::Enquiry,
        mock: true,
        ..FormDescriptor::default()
    };
    Form::new(descriptor)
        .with_field(FieldWrapper::new(Control::new("name", ControlKind::Text).required()))
        .with_field(FieldWrapper::new(
            Control::new("email", ControlKind::Email).required(),
        ))
        .with_field(FieldWrapper::new(
            Control::new("interest", ControlKind::Select)
                .with_options(["brakes", "filters", "fleet"])
                .required(),
        ))
        .with_field(FieldWrapper::new(
            Control::new("quantity", ControlKind::Number)
                .with_default("1")
                .with_range(Some(1.0), None),
        ))
        .with_field(FieldWrapper::new(Control::new("preferredDate", ControlKind::Date)))
        .with_status_region()
        .with_result_region()
        .with_mailto_action()
}

fn contact_form() -> Form {
    let descriptor = FormDescriptor {
        purpose: FormPurpose::Contact,
        mock: true,
        recipient: Some("sales@geminiparts.co.za".into()),
        ..FormDescriptor::default()
    };
    Form::new(descriptor)
        .with_field(FieldWrapper::new(Control::new("name", ControlKind::Text).required()))
        .with_field(FieldWrapper::new(
            Control::new("email", ControlKind::Email).required(),
        ))
        .with_field(FieldWrapper::new(
            Control::new("message", ControlKind::TextArea).required(),
        ))
        .with_field(FieldWrapper::new(Control::new("phone", ControlKind::Tel)))
        .with_field(FieldWrapper::bare(
            Control::new("messageType", ControlKind::Hidden).with_default("quote"),
        ))
        .with_status_region()
        .with_mailto_action()
}

async fn fill(controller: &FormController, fields: &[(&str, &str)]) {
    for (field, value) in fields {
        controller
            .dispatch(FormEvent::Input {
                field: field.to_string(),
                value: value.to_string(),
            })
            .await;
    }
}

async fn fill_enquiry(controller: &FormController) {
    fill(
        controller,
        &[
            ("name", "J Doe"),
            ("email", "j@example.com"),
            ("interest", "brakes"),
            ("quantity", "3"),
        ],
    )
    .await;
}

fn drain(states: &mut broadcast::Receiver<SubmissionState>) -> Vec<SubmissionState> {
    let mut seen = Vec::new();
    while let Ok(state) = states.try_recv() {
        seen.push(state);
    }
    seen
}

#[tokio::test]
async fn invalid_submit_focuses_first_invalid_field_without_transport_call() {
    let mut transport = MockSubmissionTransport::new();
    transport.expect_submit().never();
    let controller = FormController::new(enquiry_form(), Arc::new(transport));
    let mut states = controller.subscribe();
    fill(&controller, &[("name", "J Doe")]).await;

    controller.dispatch(FormEvent::Submit).await;

    let form = controller.snapshot().await;
    assert_eq!(form.focused(), Some("email"));
    assert!(form.field("email").expect("email").has_error);
    assert!(form.field("interest").expect("interest").has_error);
    assert!(!form.field("name").expect("name").has_error);
    assert!(!form.submit.disabled);
    assert_eq!(form.status.as_ref().expect("status").modifier, None);
    assert_eq!(
        drain(&mut states),
        vec![SubmissionState::Validating, SubmissionState::Idle]
    );
}

#[tokio::test]
async fn input_clears_only_that_fields_error() {
    let mut transport = MockSubmissionTransport::new();
    transport.expect_submit().never();
    let controller = FormController::new(enquiry_form(), Arc::new(transport));

    controller.dispatch(FormEvent::Submit).await;
    fill(&controller, &[("name", "J")]).await;

    let form = controller.snapshot().await;
    let name = form.field("name").expect("name");
    assert!(!name.has_error);
    assert_eq!(name.error_text(), "");
    let email = form.field("email").expect("email");
    assert!(email.has_error);
    assert_eq!(email.error_text(), "Please fill out this field.");
}

#[tokio::test(start_paused = true)]
async fn mock_enquiry_renders_summary_and_resets_fields() {
    let controller = FormController::new(enquiry_form(), Arc::new(MockTransport::default()));
    let mut states = controller.subscribe();
    fill_enquiry(&controller).await;

    controller.dispatch(FormEvent::Submit).await;

    let form = controller.snapshot().await;
    let status = form.status.as_ref().expect("status");
    assert_eq!(status.text, SUCCESS_MESSAGE);
    assert_eq!(status.modifier, Some(StatusModifier::Success));

    let result = form.result.as_ref().expect("result");
    assert!(!result.hidden);
    assert!(result
        .html
        .starts_with("<h3>Estimated summary for Brake systems &amp; hydraulics</h3>"));
    assert!(result
        .html
        .contains("<p><strong>Estimated cost:</strong> R\u{a0}4\u{a0}350,00</p>"));

    assert_eq!(form.field("name").expect("name").control.value, "");
    assert_eq!(form.field("quantity").expect("quantity").control.value, "1");
    assert!(!form.submit.disabled);
    assert!(!form.submit.busy);
    assert_eq!(
        drain(&mut states),
        vec![
            SubmissionState::Validating,
            SubmissionState::Submitting,
            SubmissionState::Success,
            SubmissionState::Idle,
        ]
    );
    assert_eq!(controller.state().await, SubmissionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn mock_contact_reveals_email_draft() {
    let controller = FormController::new(contact_form(), Arc::new(MockTransport::default()));
    fill(
        &controller,
        &[
            ("name", "J Doe"),
            ("email", "j@example.com"),
            ("message", "Need a quote"),
            ("phone", "0123456789"),
        ],
    )
    .await;

    controller.dispatch(FormEvent::Submit).await;

    let form = controller.snapshot().await;
    let mailto = form.mailto.as_ref().expect("mailto");
    assert!(!mailto.hidden);
    let href = mailto.href.as_ref().expect("href");
    assert!(href.starts_with("mailto:sales@geminiparts.co.za?subject=%5BQUOTE%5D"));
    assert!(href.contains("Phone%3A%200123456789"));
    assert_eq!(
        form.status.as_ref().expect("status").text,
        crate::interpreter::CONTACT_PREVIEW
    );
}

#[tokio::test]
async fn transport_failure_shows_generic_error_and_keeps_values() {
    let mut transport = MockSubmissionTransport::new();
    transport
        .expect_submit()
        .times(1)
        .returning(|_, _| Err(TransportError::Status { status: 503 }));
    let controller = FormController::new(enquiry_form(), Arc::new(transport));
    let mut states = controller.subscribe();
    fill_enquiry(&controller).await;

    controller.dispatch(FormEvent::Submit).await;

    let form = controller.snapshot().await;
    let status = form.status.as_ref().expect("status");
    assert_eq!(status.text, ERROR_MESSAGE);
    assert_eq!(status.modifier, Some(StatusModifier::Error));
    assert!(form.result.as_ref().expect("result").hidden);
    assert_eq!(form.field("name").expect("name").control.value, "J Doe");
    assert!(!form.submit.disabled);
    assert!(!form.submit.busy);
    assert_eq!(
        drain(&mut states),
        vec![
            SubmissionState::Validating,
            SubmissionState::Submitting,
            SubmissionState::Error,
            SubmissionState::Idle,
        ]
    );
}

#[tokio::test]
async fn transport_receives_current_payload() {
    let mut transport = MockSubmissionTransport::new();
    transport
        .expect_submit()
        .withf(|descriptor, payload| {
            descriptor.purpose == FormPurpose::Enquiry
                && payload.get("interest") == Some("brakes")
                && payload.get("quantity") == Some("3")
                && payload.get("preferredDate") == Some("")
        })
        .times(1)
        .returning(|_, _| Ok(TransportResponse::Text("accepted".into())));
    let controller = FormController::new(enquiry_form(), Arc::new(transport));
    fill_enquiry(&controller).await;

    controller.dispatch(FormEvent::Submit).await;

    let form = controller.snapshot().await;
    assert!(form
        .result
        .expect("result")
        .html
        .contains("R\u{a0}4\u{a0}350,00"));
}

#[derive(Default)]
struct GatedTransport {
    calls: AtomicUsize,
    release: Notify,
}

#[async_trait]
impl SubmissionTransport for GatedTransport {
    async fn submit(
        &self,
        _descriptor: &FormDescriptor,
        _payload: &Payload,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok(TransportResponse::Text("ok".into()))
    }
}

#[tokio::test]
async fn second_submit_while_in_flight_is_ignored() {
    let gate = Arc::new(GatedTransport::default());
    let controller = Arc::new(FormController::new(enquiry_form(), gate.clone()));
    fill_enquiry(&controller).await;
    let mut states = controller.subscribe();

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.dispatch(FormEvent::Submit).await }
    });
    while states.recv().await.expect("state") != SubmissionState::Submitting {}

    let in_flight = controller.snapshot().await;
    assert!(in_flight.submit.disabled);
    assert!(in_flight.submit.busy);
    assert_eq!(
        in_flight.status.as_ref().expect("status").text,
        LOADING_MESSAGE
    );

    controller.dispatch(FormEvent::Submit).await;
    fill(&controller, &[("name", "Someone else")]).await;
    assert_eq!(gate.calls.load(Ordering::SeqCst), 1);

    gate.release.notify_one();
    first.await.expect("first submission");

    let form = controller.snapshot().await;
    assert_eq!(gate.calls.load(Ordering::SeqCst), 1);
    assert!(!form.submit.disabled);
    assert!(!form.submit.busy);
    assert_eq!(form.field("name").expect("name").control.value, "");
}

#[tokio::test(start_paused = true)]
async fn abandoned_submission_releases_submit_control() {
    let gate = Arc::new(GatedTransport::default());
    let controller = FormController::new(enquiry_form(), gate.clone());
    fill_enquiry(&controller).await;

    let elapsed = tokio::time::timeout(
        std::time::Duration::from_millis(50),
        controller.dispatch(FormEvent::Submit),
    )
    .await;
    assert!(elapsed.is_err());
    assert_eq!(gate.calls.load(Ordering::SeqCst), 1);

    let form = controller.snapshot().await;
    assert!(!form.submit.disabled);
    assert!(!form.submit.busy);
    assert_eq!(controller.state().await, SubmissionState::Idle);

    gate.release.notify_one();
    controller.dispatch(FormEvent::Submit).await;
    assert_eq!(gate.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn controller_takes_over_native_validation() {
    let controller = FormController::new(enquiry_form(), Arc::new(MockSubmissionTransport::new()));
    assert!(controller.snapshot().await.novalidate);
}

#[tokio::test]
async fn input_for_unknown_field_is_ignored() {
    let controller = FormController::new(enquiry_form(), Arc::new(MockSubmissionTransport::new()));
    fill(&controller, &[("coupon", "FREE")]).await;
    assert!(controller.snapshot().await.field("coupon").is_none());
}

#[tokio::test]
async fn checkbox_toggle_feeds_payload() {
    let form = Form::new(FormDescriptor::default())
        .with_field(FieldWrapper::new(
            Control::new("consent", ControlKind::Checkbox).required(),
        ))
        .with_status_region();
    let mut transport = MockSubmissionTransport::new();
    transport
        .expect_submit()
        .withf(|_, payload| payload.get("consent") == Some("on"))
        .times(1)
        .returning(|_, _| Ok(TransportResponse::Text(String::new())));
    let controller = FormController::new(form, Arc::new(transport));

    controller
        .dispatch(FormEvent::Check {
            field: "consent".into(),
            checked: true,
        })
        .await;
    controller.dispatch(FormEvent::Submit).await;

    let form = controller.snapshot().await;
    assert_eq!(form.status.as_ref().expect("status").text, SUCCESS_MESSAGE);
    assert!(!form.field("consent").expect("consent").control.checked);
}
