use crate::demo::{
    run_demo, run_field_validation, run_form_validation, run_ratio, run_request_list,
    run_savings_score, DemoArgs, FieldArgs, FormArgs, RatioArgs, RequestListArgs, SavingsArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use presta_banco::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "PrestaBanco Loan Desk",
    about = "Run the PrestaBanco loan desk service and its rule checks from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Check a single field or a whole form against the desk rules
    Validate {
        #[command(subcommand)]
        command: ValidateCommand,
    },
    /// Compute a payment-to-income or debt-to-income ratio
    Ratio(RatioArgs),
    /// Score the savings-capacity checklist
    Savings(SavingsArgs),
    /// Inspect a credit request export
    Requests {
        #[command(subcommand)]
        command: RequestsCommand,
    },
    /// Walk a request list through evaluation, approval and disbursement
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ValidateCommand {
    /// Validate one raw field value
    Field(FieldArgs),
    /// Validate every field and document of a form
    Form(FormArgs),
}

#[derive(Subcommand, Debug)]
enum RequestsCommand {
    /// List requests with the action the desk offers for each
    List(RequestListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seed the in-memory backend from a request export instead of the demo list
    #[arg(long)]
    pub(crate) requests_csv: Option<PathBuf>,
    /// Monthly payment quoted by the in-memory backend
    #[arg(long)]
    pub(crate) monthly_payment: Option<f64>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Validate {
            command: ValidateCommand::Field(args),
        } => run_field_validation(args),
        Command::Validate {
            command: ValidateCommand::Form(args),
        } => run_form_validation(args),
        Command::Ratio(args) => run_ratio(args),
        Command::Savings(args) => run_savings_score(args),
        Command::Requests {
            command: RequestsCommand::List(args),
        } => run_request_list(args),
        Command::Demo(args) => run_demo(args),
    }
}
