use std::sync::Arc;

use super::common::*;
use crate::loans::backend::{BackendError, LoanBackend};
use crate::loans::documents::DocumentKey;
use crate::loans::domain::{ApplicationId, LoanType};
use crate::loans::evaluation::{EvaluationForm, EvaluationFormError, EvaluationQuestion};
use crate::loans::ratios::{RatioInputError, RatioKind};
use crate::loans::savings::SavingsQuestion;
use crate::loans::service::{ActionOutcome, LoanDeskService, ServiceError, DELETE_PROMPT};
use crate::loans::status::{EvaluationExit, NavigationTarget, OfferResponse, TransitionCode};
use crate::loans::validation::rules::RUT_FORMAT;

#[test]
fn request_rows_follow_backend_order() {
    let (service, _, _) = build_service(vec![
        application(1, "firstHome", "En Aprobación Final"),
        application(2, "commercial", "Finalizada"),
    ]);

    let rows = service.request_rows().expect("rows load");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].position, 1);
    assert_eq!(rows[0].action_label, "Aprobar Solicitud");
    assert_eq!(rows[1].loan_type_label, "Propiedad Comercial");
    assert!(!rows[1].enabled);
}

#[test]
fn transition_action_updates_backend_status() {
    let (service, backend, _) = build_service(vec![application(4, "secondHome", "Aprobada")]);

    let outcome = service
        .trigger_action(ApplicationId(4), "Aprobada")
        .expect("action runs");

    assert_eq!(
        outcome,
        ActionOutcome::Transitioned {
            id: ApplicationId(4),
            code: TransitionCode::E9,
            status: "En Desembolso",
        }
    );
    assert_eq!(
        backend.status_edits(),
        vec![(ApplicationId(4), TransitionCode::E9)]
    );
}

#[test]
fn disabled_rows_never_reach_the_backend() {
    let (service, backend, _) = build_service(vec![application(5, "firstHome", "Finalizada")]);

    match service.trigger_action(ApplicationId(5), "Finalizada") {
        Err(ServiceError::ActionDisabled { id, status }) => {
            assert_eq!(id, ApplicationId(5));
            assert_eq!(status, "Finalizada");
        }
        other => panic!("expected disabled action, got {other:?}"),
    }
    assert_eq!(backend.calls(), 0);
}

#[test]
fn navigation_rows_only_open_the_evaluation() {
    let (service, backend, _) = build_service(vec![application(6, "remodeling", "En Evaluación")]);

    let outcome = service
        .trigger_action(ApplicationId(6), "En Evaluación")
        .expect("navigation");
    assert_eq!(
        outcome,
        ActionOutcome::Navigate {
            id: ApplicationId(6),
            target: NavigationTarget::Evaluation,
        }
    );
    assert!(backend.status_edits().is_empty());
}

#[test]
fn payment_ratio_uses_backend_quote() {
    let (service, backend, _) = build_service(Vec::new());
    let application = application(8, "firstHome", "En Evaluación");

    let assessment = service
        .payment_to_income(&application, "1000000")
        .expect("ratio computed");

    assert_eq!(assessment.kind, RatioKind::PaymentToIncome);
    assert!((assessment.ratio - 35.0).abs() < 1e-9);
    assert!(assessment.is_approved());
    assert_eq!(backend.calls(), 1);
}

#[test]
fn zero_income_is_refused_before_the_backend() {
    let (service, backend, _) = build_service(Vec::new());
    let application = application(8, "firstHome", "En Evaluación");

    match service.payment_to_income(&application, "0") {
        Err(ServiceError::Input(RatioInputError::NotPositive { field })) => {
            assert_eq!(field, "monthlyIncome");
        }
        other => panic!("expected input error, got {other:?}"),
    }
    assert!(matches!(
        service.payment_to_income(&application, "abc"),
        Err(ServiceError::Input(RatioInputError::NotNumeric { .. }))
    ));
    assert_eq!(backend.calls(), 0);
}

#[test]
fn debt_ratio_is_local() {
    let (service, backend, _) = build_service(Vec::new());

    let assessment = service
        .debt_to_income("500000", "1000000")
        .expect("ratio computed");
    assert!(assessment.is_approved());

    let rejected = service
        .debt_to_income("500001", "1000000")
        .expect("ratio computed");
    assert!(!rejected.is_approved());
    assert_eq!(backend.calls(), 0);
}

#[test]
fn evaluation_submission_is_gated_on_savings() {
    let (service, backend, _) = build_service(vec![application(3, "firstHome", "En Evaluación")]);
    let form = EvaluationForm::new(ApplicationId(3))
        .with_answer(EvaluationQuestion::IncomeQuota, true)
        .with_savings_answer(SavingsQuestion::RegularDeposits, true);

    assert!(matches!(
        service.submit_evaluation(&form),
        Err(ServiceError::Evaluation(EvaluationFormError::SavingsNotReviewed(_)))
    ));
    assert!(backend.evaluations().is_empty());

    service
        .submit_evaluation(&form.check_savings())
        .expect("submitted");
    let submitted = backend.evaluations();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].savings_capacity, Some(false));
    assert_eq!(submitted[0].income_quota, Some(true));
}

#[test]
fn leaving_an_evaluation_returns_it_to_documentation() {
    let (service, backend, _) = build_service(vec![application(3, "firstHome", "En Evaluación")]);

    let code = service
        .leave_evaluation(ApplicationId(3), EvaluationExit::MissingDocuments)
        .expect("status updated");
    assert_eq!(code, TransitionCode::E2);

    let statuses = service.client_requests("12345678-9").expect("statuses");
    assert_eq!(statuses[0].status, "Pendiente de Documentación");
    assert_eq!(backend.status_edits().len(), 1);
}

#[test]
fn offer_responses_map_to_codes() {
    let (service, backend, _) = build_service(vec![
        application(1, "firstHome", "Pre-Aprobada"),
        application(2, "firstHome", "Pre-Aprobada"),
    ]);

    service
        .respond_to_offer(ApplicationId(1), OfferResponse::Accept)
        .expect("accepted");
    service
        .respond_to_offer(ApplicationId(2), OfferResponse::Reject)
        .expect("rejected");

    assert_eq!(
        backend.status_edits(),
        vec![
            (ApplicationId(1), TransitionCode::E5),
            (ApplicationId(2), TransitionCode::E8),
        ]
    );
}

#[test]
fn client_requests_validate_rut_first() {
    let (service, backend, _) = build_service(vec![application(1, "firstHome", "En Evaluación")]);

    match service.client_requests("12.345.678-9") {
        Err(ServiceError::Validation(result)) => assert_eq!(result.message("rut"), RUT_FORMAT),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(backend.calls(), 0);
}

#[test]
fn delete_asks_for_confirmation() {
    let backend = Arc::new(MemoryBackend::with_applications(vec![application(
        1,
        "firstHome",
        "En Evaluación",
    )]));
    let declining = Arc::new(RecordingShell::confirming(false));
    let service = LoanDeskService::new(backend.clone(), declining.clone());

    assert!(!service.delete_request(ApplicationId(1)).expect("declined"));
    assert_eq!(declining.prompts(), vec![DELETE_PROMPT.to_string()]);
    assert_eq!(backend.calls(), 0);

    let (service, backend, shell) =
        build_service(vec![application(1, "firstHome", "En Evaluación")]);
    assert!(service.delete_request(ApplicationId(1)).expect("deleted"));
    assert_eq!(shell.prompts().len(), 1);
    assert!(backend
        .applications
        .lock()
        .expect("applications mutex poisoned")
        .is_empty());
}

#[test]
fn downloads_are_named_after_the_document_key() {
    let (service, backend, shell) = build_service(Vec::new());
    backend
        .documents
        .lock()
        .expect("documents mutex poisoned")
        .insert((ApplicationId(2), DocumentKey::ProofIncome), vec![0x25, 0x50, 0x44, 0x46]);

    let file_name = service
        .download_document(ApplicationId(2), DocumentKey::ProofIncome)
        .expect("downloaded");

    assert_eq!(file_name, "proofIncome.pdf");
    assert_eq!(
        shell.deliveries(),
        vec![("proofIncome.pdf".to_string(), "application/pdf".to_string(), 4)]
    );

    match service.download_document(ApplicationId(2), DocumentKey::BusinessPlan) {
        Err(ServiceError::Backend(BackendError::DocumentMissing { key, .. })) => {
            assert_eq!(key, DocumentKey::BusinessPlan);
        }
        other => panic!("expected missing document, got {other:?}"),
    }
}

#[test]
fn simulation_is_validated_before_quoting() {
    let (service, backend, _) = build_service(Vec::new());

    let quote = service
        .simulate(&simulation_submission())
        .expect("quote returned");
    assert_eq!(quote.request.amount, 50_000_000);
    assert!((quote.monthly_payment - 350_000.0).abs() < f64::EPSILON);

    let invalid = simulation_submission().with_value("term", "60");
    assert!(matches!(
        service.simulate(&invalid),
        Err(ServiceError::Validation(_))
    ));
    assert_eq!(backend.calls(), 1);
}

#[test]
fn loan_requests_are_created_in_initial_review() {
    let (service, backend, _) = build_service(vec![application(10, "commercial", "Aprobada")]);

    let id = service
        .submit_loan_request(LoanType::FirstHome, &first_home_submission())
        .expect("request created");
    assert_eq!(id, ApplicationId(11));

    let created = backend.fetch_application(id).expect("stored");
    assert_eq!(created.status, "En Revisión Inicial");
    assert_eq!(created.loan_type, "firstHome");

    let long_term = first_home_submission().with_value("term", "31");
    match service.submit_loan_request(LoanType::FirstHome, &long_term) {
        Err(ServiceError::Validation(result)) => {
            assert_eq!(result.message("term"), "El plazo debe ser entre 1 y 30 años");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn registration_checks_rut_availability() {
    let (service, backend, _) = build_service(Vec::new());

    service
        .register_client(&registration_submission())
        .expect("registered");
    assert_eq!(backend.registered.lock().expect("registered mutex poisoned").len(), 1);

    match service.register_client(&registration_submission()) {
        Err(ServiceError::RutUnavailable(rut)) => assert_eq!(rut, "12345678-9"),
        other => panic!("expected duplicate rut, got {other:?}"),
    }

    let underage = registration_submission().with_value("dateOfBirth", "2010-01-01");
    assert!(matches!(
        service.register_client(&underage),
        Err(ServiceError::Validation(_))
    ));
}

#[test]
fn backend_outages_propagate() {
    let service = LoanDeskService::new(
        Arc::new(UnavailableBackend),
        Arc::new(RecordingShell::confirming(true)),
    );

    assert!(matches!(
        service.request_rows(),
        Err(ServiceError::Backend(BackendError::Unavailable(_)))
    ));
    assert!(matches!(
        service.trigger_action(ApplicationId(1), "Aprobada"),
        Err(ServiceError::Backend(BackendError::Unavailable(_)))
    ));
}
