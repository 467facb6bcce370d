use crate::infra::{
    attachment_from_path, demo_applications, parse_date, parse_form_kind, parse_loan_type,
    parse_pair, InMemoryLoanBackend, LocalShell, DEFAULT_MONTHLY_PAYMENT,
};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use presta_banco::error::AppError;
use presta_banco::loans::ratios::parse_non_negative;
use presta_banco::loans::validation;
use presta_banco::loans::{
    load_applications, request_rows, ActionOutcome, Attachment, Confirmation, DocumentKey,
    EvaluationForm, EvaluationQuestion, FieldValidator, FileDelivery, FormKind, FormSchema,
    FormSubmission, LoanApplication, LoanBackend, LoanDeskService, LoanType, NextAction,
    PositiveAmount, RatioAssessment, RatioInputError, RatioKind, RequestRow, SavingsChecklist,
    SavingsQuestion, ServiceError, ValidationResult,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct FieldArgs {
    /// Field name, e.g. rut, email, maximumAmount, interestRate, term
    #[arg(long)]
    pub(crate) name: String,
    /// Raw value as typed into the form
    #[arg(long, default_value = "")]
    pub(crate) value: String,
    /// Loan type whose bounds apply (defaults to the simulator bounds)
    #[arg(long, value_parser = parse_loan_type)]
    pub(crate) loan_type: Option<LoanType>,
    /// Reference date for age checks (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct FormArgs {
    /// registration, simulation or a loan type code
    #[arg(value_parser = parse_form_kind)]
    pub(crate) form: FormKind,
    /// Field value as FIELD=VALUE; repeat for each field
    #[arg(long = "value", value_parser = parse_pair)]
    pub(crate) values: Vec<(String, String)>,
    /// Document as KEY=PATH; the content type is guessed from the extension
    #[arg(long = "attach", value_parser = parse_pair)]
    pub(crate) attachments: Vec<(String, String)>,
    /// Reference date for age checks (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum RatioChoice {
    /// Monthly payment over monthly income, approved up to 35%
    Payment,
    /// Current debts over monthly income, approved up to 50%
    Debt,
}

#[derive(Args, Debug)]
pub(crate) struct RatioArgs {
    #[arg(value_enum)]
    pub(crate) kind: RatioChoice,
    /// Monthly payment or current debts, depending on the ratio
    #[arg(long)]
    pub(crate) amount: String,
    /// Monthly income
    #[arg(long)]
    pub(crate) income: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SavingsArgs {
    /// Current savings-capacity answer from the evaluation form
    #[arg(long)]
    pub(crate) capacity: bool,
    #[arg(long)]
    pub(crate) savings_balance: bool,
    #[arg(long)]
    pub(crate) positive_balance: bool,
    #[arg(long)]
    pub(crate) regular_deposits: bool,
    #[arg(long)]
    pub(crate) accumulated_balance: bool,
    #[arg(long)]
    pub(crate) avoid_withdrawals: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RequestListArgs {
    /// Request export to list (defaults to the demo requests)
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Request export to start from (defaults to the demo requests)
    #[arg(long)]
    pub(crate) requests_csv: Option<PathBuf>,
    /// Reference date for validation (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Monthly income used for the ratio checks
    #[arg(long, default_value = "1200000")]
    pub(crate) monthly_income: String,
    /// Current debts used for the debt ratio check
    #[arg(long, default_value = "300000")]
    pub(crate) current_debts: String,
    /// Monthly payment quoted by the in-memory backend
    #[arg(long)]
    pub(crate) monthly_payment: Option<f64>,
    /// Answer yes to the delete confirmation
    #[arg(long)]
    pub(crate) confirm_delete: bool,
    /// Directory receiving downloaded documents (defaults to the temp dir)
    #[arg(long)]
    pub(crate) download_dir: Option<PathBuf>,
}

pub(crate) fn run_field_validation(args: FieldArgs) -> Result<(), AppError> {
    let FieldArgs {
        name,
        value,
        loan_type,
        today,
    } = args;

    let today = today.unwrap_or_else(validation::today);
    let validator = match loan_type {
        Some(loan_type) => FieldValidator::for_loan_type(loan_type, today),
        None => FieldValidator::for_simulation(today),
    };

    let message = validator.validate(&name, &value);
    if message.is_empty() {
        println!("{name}: ok");
    } else {
        println!("{name}: {message}");
    }
    Ok(())
}

pub(crate) fn run_form_validation(args: FormArgs) -> Result<(), AppError> {
    let FormArgs {
        form,
        values,
        attachments,
        today,
    } = args;

    let today = today.unwrap_or_else(validation::today);
    let mut submission = FormSubmission::default();
    for (field, value) in values {
        submission = submission.with_value(&field, value);
    }
    for (key, path) in attachments {
        let attachment = attachment_from_path(Path::new(&path))?;
        submission = submission.with_attachment(&key, attachment);
    }

    let result = FormSchema::for_kind(form).validate(&submission, today);
    render_validation(form, &result);
    Ok(())
}

pub(crate) fn run_ratio(args: RatioArgs) -> Result<(), AppError> {
    let assessment = assess_ratio(&args).map_err(ServiceError::from)?;
    render_ratio(&assessment);
    Ok(())
}

fn assess_ratio(args: &RatioArgs) -> Result<RatioAssessment, RatioInputError> {
    let income = PositiveAmount::parse("monthlyIncome", &args.income)?;
    let (kind, field) = match args.kind {
        RatioChoice::Payment => (RatioKind::PaymentToIncome, "monthlyPayment"),
        RatioChoice::Debt => (RatioKind::DebtToIncome, "currentDebts"),
    };
    let amount = parse_non_negative(field, &args.amount)?;
    Ok(RatioAssessment::assess(kind, amount, income.get()))
}

pub(crate) fn run_savings_score(args: SavingsArgs) -> Result<(), AppError> {
    let checklist = savings_checklist(&args);
    let outcome = checklist.score(Some(args.capacity));
    let positive = checklist
        .answers(Some(args.capacity))
        .iter()
        .filter(|answer| **answer)
        .count();

    println!("Savings capacity: {} ({positive}/6 positive)", outcome.label());
    for question in SavingsQuestion::ALL {
        let answer = if checklist.answer(question) == Some(true) {
            "sí"
        } else {
            "no"
        };
        println!("- [{answer}] {}", question.prompt());
    }
    Ok(())
}

fn savings_checklist(args: &SavingsArgs) -> SavingsChecklist {
    [
        (SavingsQuestion::SavingsBalance, args.savings_balance),
        (SavingsQuestion::PositiveBalance, args.positive_balance),
        (SavingsQuestion::RegularDeposits, args.regular_deposits),
        (SavingsQuestion::AccumulatedBalance, args.accumulated_balance),
        (SavingsQuestion::AvoidWithdrawals, args.avoid_withdrawals),
    ]
    .into_iter()
    .fold(SavingsChecklist::default(), |checklist, (question, value)| {
        checklist.with_answer(question, value)
    })
}

pub(crate) fn run_request_list(args: RequestListArgs) -> Result<(), AppError> {
    let applications = load_requests(args.csv)?;
    render_rows(&request_rows(&applications));
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        requests_csv,
        today,
        monthly_income,
        current_debts,
        monthly_payment,
        confirm_delete,
        download_dir,
    } = args;

    let today = today.unwrap_or_else(validation::today);
    let backend = Arc::new(InMemoryLoanBackend::new(
        load_requests(requests_csv)?,
        monthly_payment.unwrap_or(DEFAULT_MONTHLY_PAYMENT),
    ));
    let shell = Arc::new(LocalShell::new(
        confirm_delete,
        download_dir.unwrap_or_else(std::env::temp_dir),
    ));
    let service = LoanDeskService::new(backend.clone(), shell).with_reference_date(today);

    println!("PrestaBanco loan desk demo (reference date {today})");
    let rows = service.request_rows()?;
    render_rows(&rows);

    println!("\nEvaluations");
    let in_evaluation = rows
        .iter()
        .filter(|row| matches!(row.action, NextAction::Navigate { .. }));
    for row in in_evaluation {
        let application = backend
            .fetch_application(row.id)
            .map_err(ServiceError::from)?;
        evaluate(&service, &application, &monthly_income, &current_debts)?;
    }
    println!(
        "- {} evaluation(s) stored by the backend",
        backend.evaluations().len()
    );

    println!("\nPipeline actions");
    for row in rows.iter().filter(|row| row.enabled) {
        match service.trigger_action(row.id, &row.status)? {
            ActionOutcome::Transitioned { id, code, status } => {
                println!("- Request {id}: {} -> {code} -> {status}", row.action_label);
            }
            ActionOutcome::Navigate { id, .. } => {
                println!("- Request {id}: opens the evaluation view");
            }
        }
    }
    render_rows(&service.request_rows()?);

    println!("\nNew client");
    let simulation = FormSubmission::default()
        .with_value("amount", "80000000")
        .with_value("interestRate", "4.5")
        .with_value("term", "25");
    let quote = service.simulate(&simulation)?;
    println!(
        "- Simulated {} over {} years at {}%: monthly payment {:.0}",
        quote.request.amount, quote.request.term, quote.request.interest_rate, quote.monthly_payment
    );

    let rut = "20111222-3";
    service.register_client(&demo_registration(rut))?;
    println!("- Registered client {rut}");

    let id = service.submit_loan_request(LoanType::FirstHome, &demo_first_home_request(rut))?;
    println!("- Created first home request {id}");

    backend.store_document(id, DocumentKey::ProofIncome, b"%PDF-1.4 demo".to_vec());
    let file_name = service.download_document(id, DocumentKey::ProofIncome)?;
    println!("- Downloaded {file_name}");

    for status in service.client_requests(rut)? {
        println!("- Client request {}: {}", status.id, status.status);
    }

    if service.delete_request(id)? {
        println!("- Request {id} deleted");
    } else {
        println!("- Deletion of request {id} declined");
    }

    Ok(())
}

fn evaluate<B, S>(
    service: &LoanDeskService<B, S>,
    application: &LoanApplication,
    monthly_income: &str,
    current_debts: &str,
) -> Result<(), AppError>
where
    B: LoanBackend + 'static,
    S: Confirmation + FileDelivery + 'static,
{
    println!("- Request {} ({})", application.id, application.loan_type);
    let payment = service.payment_to_income(application, monthly_income)?;
    render_ratio(&payment);
    let debt = service.debt_to_income(current_debts, monthly_income)?;
    render_ratio(&debt);

    let form = EvaluationQuestion::ALL
        .into_iter()
        .fold(EvaluationForm::new(application.id), |form, question| {
            let answer = match question {
                EvaluationQuestion::IncomeQuota => payment.is_approved(),
                EvaluationQuestion::IncomeDebtRelation => debt.is_approved(),
                _ => true,
            };
            form.with_answer(question, answer)
        });
    let form = SavingsQuestion::ALL
        .into_iter()
        .fold(form, |form, question| form.with_savings_answer(question, true))
        .check_savings();

    if let Some(outcome) = form.savings_outcome() {
        println!("  Savings capacity: {}", outcome.label());
    }
    service.submit_evaluation(&form)?;
    Ok(())
}

fn load_requests(path: Option<PathBuf>) -> Result<Vec<LoanApplication>, AppError> {
    match path {
        Some(path) => load_applications(path).map_err(AppError::from),
        None => Ok(demo_applications()),
    }
}

fn demo_registration(rut: &str) -> FormSubmission {
    FormSubmission::default()
        .with_value("name", "Camila")
        .with_value("lastName", "Fuentes")
        .with_value("rut", rut)
        .with_value("password", "Ahorro2024")
        .with_value("dateOfBirth", "1991-07-12")
        .with_value("email", "camila.fuentes@correo.cl")
}

fn demo_first_home_request(rut: &str) -> FormSubmission {
    FormSubmission::default()
        .with_value("rut", rut)
        .with_value("maximumAmount", "80000000")
        .with_value("interestRate", "4.5")
        .with_value("term", "25")
        .with_attachment("proofIncome", Attachment::pdf("liquidaciones.pdf", 24_576))
        .with_attachment("appraisalCertificate", Attachment::pdf("tasacion.pdf", 61_440))
        .with_attachment("creditHistory", Attachment::pdf("informe-deudas.pdf", 12_288))
        .with_attachment("bankAccountState", Attachment::pdf("cartola.pdf", 9_216))
        .with_attachment("workCertificate", Attachment::pdf("contrato.pdf", 5_120))
}

fn render_rows(rows: &[RequestRow]) {
    if rows.is_empty() {
        println!("No requests");
        return;
    }
    for row in rows {
        let action = if row.enabled {
            row.action_label.to_string()
        } else {
            format!("{} (disabled)", row.action_label)
        };
        println!(
            "{:>3}. #{} {} | {} {} ({}) | {} | {}",
            row.position,
            row.id,
            row.loan_type_label,
            row.name,
            row.last_name,
            row.rut,
            row.status,
            action
        );
    }
}

fn render_ratio(assessment: &RatioAssessment) {
    println!("  {}", assessment.summary());
    println!("  {}", assessment.message());
}

fn render_validation(form: FormKind, result: &ValidationResult) {
    if result.is_valid() {
        println!("{form}: all fields valid");
        return;
    }
    println!("{form}: {} field(s) need attention", result.failures().count());
    for (field, message) in result.failures() {
        println!("- {field}: {message}");
    }
}
