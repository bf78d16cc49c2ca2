use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use form_core::{
    form::ControlKind, search::search_destination, select_transport, FormController, FormEvent,
    MockTransport, NetworkTransport, ResponseInterpreter,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod report;

#[derive(Parser, Debug)]
#[command(about = "Drive the site's enhanced enquiry and contact forms from a terminal")]
struct Args {
    /// TOML file with page settings and form declarations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill a declared form and submit it.
    Submit {
        #[arg(long)]
        form: String,
        /// `name=value`; repeat for each field.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
        /// Submit with no network available.
        #[arg(long)]
        offline: bool,
    },
    /// Print the search destination for a query.
    Search { query: String },
    /// List declared forms.
    Forms,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();
    let settings = config::load_settings(args.config.as_deref())?;

    match args.command {
        Command::Forms => {
            for form in &settings.forms {
                println!(
                    "{}\t{}\tmock={}",
                    form.id,
                    form.form_type.as_deref().unwrap_or("other"),
                    form.mock
                );
            }
        }
        Command::Search { query } => match search_destination(&query) {
            Ok(destination) => println!("{destination}"),
            Err(err) => bail!("{err}"),
        },
        Command::Submit {
            form,
            fields,
            offline,
        } => {
            let declaration = settings.form(&form)?;
            let form = declaration.build()?;

            let interpreter = ResponseInterpreter::new(settings.default_recipient.clone());
            let mock = MockTransport::new(settings.mock_latency(), interpreter.clone());
            let network = if offline || settings.force_mock {
                None
            } else {
                Some(NetworkTransport::new(settings.page_url()?))
            };
            let transport = select_transport(&form.descriptor, mock, network);

            let kinds: Vec<(String, ControlKind)> = form
                .fields
                .iter()
                .map(|f| (f.control.name.clone(), f.control.kind))
                .collect();
            let controller = FormController::new(form, transport).with_interpreter(interpreter);

            for (field, value) in fields {
                let is_checkbox = kinds
                    .iter()
                    .any(|(name, kind)| *name == field && *kind == ControlKind::Checkbox);
                let event = if is_checkbox {
                    FormEvent::Check {
                        checked: config::is_truthy(&value),
                        field,
                    }
                } else {
                    FormEvent::Input { field, value }
                };
                controller.dispatch(event).await;
            }

            info!(form = %declaration.id, "submitting");
            controller.dispatch(FormEvent::Submit).await;
            print!("{}", report::render(&controller.snapshot().await));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_value_pairs() {
        assert_eq!(
            parse_field("message=a=b").expect("field"),
            ("message".to_string(), "a=b".to_string())
        );
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
    }
}
