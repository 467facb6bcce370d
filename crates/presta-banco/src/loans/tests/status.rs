use super::common::application;
use crate::loans::domain::LoanType;
use crate::loans::listing::RequestRow;
use crate::loans::status::{
    action_label, label_for, next_action_for, EvaluationExit, NavigationTarget, NextAction,
    OfferResponse, TransitionCode, APPROVED, FINALIZED, IN_DISBURSEMENT, IN_FINAL_APPROVAL,
    KNOWN_STATUSES,
};

#[test]
fn loan_type_codes_render_labels() {
    assert_eq!(label_for("firstHome"), "Primera Vivienda");
    assert_eq!(label_for("secondHome"), "Segunda Vivienda");
    assert_eq!(label_for("commercial"), "Propiedad Comercial");
    assert_eq!(label_for("remodeling"), "Remodelación");
    assert_eq!(label_for("leasing"), "leasing");
}

#[test]
fn approval_pipeline_statuses_transition() {
    assert_eq!(
        next_action_for(IN_FINAL_APPROVAL),
        NextAction::Transition {
            target_status: TransitionCode::E6
        }
    );
    assert_eq!(
        next_action_for(APPROVED),
        NextAction::Transition {
            target_status: TransitionCode::E9
        }
    );
    assert_eq!(
        next_action_for(IN_DISBURSEMENT),
        NextAction::Transition {
            target_status: TransitionCode::E10
        }
    );
    assert_eq!(action_label(IN_FINAL_APPROVAL), "Aprobar Solicitud");
    assert_eq!(action_label(APPROVED), "Desembolso");
    assert_eq!(action_label(IN_DISBURSEMENT), "Finalizar");
}

#[test]
fn finalized_requests_are_disabled_for_every_product() {
    for (position, loan_type) in LoanType::ALL.into_iter().enumerate() {
        let application = application(position as u64 + 1, loan_type.code(), FINALIZED);
        let row = RequestRow::from_application(position + 1, &application);
        assert_eq!(row.action, NextAction::Disabled, "{loan_type}");
        assert!(!row.enabled);
        assert_eq!(row.loan_type_label, loan_type.label());
    }
}

#[test]
fn other_statuses_open_the_evaluation() {
    for status in ["En Evaluación", "Pre-Aprobada", "Rechazada", "", "Desconocido"] {
        assert_eq!(
            next_action_for(status),
            NextAction::Navigate {
                target: NavigationTarget::Evaluation
            }
        );
        assert_eq!(action_label(status), "Ver Detalle");
    }
}

#[test]
fn vocabulary_maps_without_gaps() {
    let codes = ["firstHome", "secondHome", "commercial", "remodeling", "other"];
    for (position, status) in KNOWN_STATUSES.into_iter().enumerate() {
        let code = codes[position % codes.len()];
        let row = RequestRow::from_application(position + 1, &application(1, code, status));
        assert_eq!(row.loan_type_label, label_for(code));
        assert!(!row.loan_type_label.is_empty());
        assert_eq!(row.action, next_action_for(status));
        assert_eq!(row.action_label, action_label(status));
        assert!(!row.action_label.is_empty());
        assert_eq!(row.enabled, status != FINALIZED);
    }
}

#[test]
fn transition_codes_round_trip() {
    for code in TransitionCode::ALL {
        assert_eq!(TransitionCode::from_code(code.code()), Some(code));
        assert!(KNOWN_STATUSES.contains(&code.resulting_status()));
    }
    assert_eq!(TransitionCode::from_code(" e7 "), Some(TransitionCode::E7));
    assert_eq!(TransitionCode::from_code("E11"), None);
    assert_eq!(TransitionCode::FINALIZE.resulting_status(), FINALIZED);
}

#[test]
fn offer_and_exit_codes() {
    assert_eq!(OfferResponse::Accept.transition(), TransitionCode::E5);
    assert_eq!(OfferResponse::Reject.transition(), TransitionCode::E8);
    assert_eq!(EvaluationExit::MissingDocuments.transition(), TransitionCode::E2);
    assert_eq!(EvaluationExit::Cancel.transition(), TransitionCode::E2);
}

#[test]
fn next_action_serializes_with_kind_tag() {
    let payload = serde_json::to_value(next_action_for(APPROVED)).expect("serializes");
    assert_eq!(payload["kind"], "transition");
    assert_eq!(payload["target_status"], "E9");

    let payload = serde_json::to_value(next_action_for(FINALIZED)).expect("serializes");
    assert_eq!(payload["kind"], "disabled");
}
