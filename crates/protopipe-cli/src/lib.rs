//! Command-line interface for protopipe.
//!
//! The command tree lives here so parsing is testable; the binary in
//! `src/bin/protopipe.rs` only parses, installs telemetry, and runs.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use protopipe::consumer::TopicConsumer;
use protopipe::producer::RecordProducer;
use protopipe::registry::{SchemaRegistryClient, subject_for_topic};
use protopipe::{Person, PipeError};

const SCHEMA_SAVE_EXAMPLES: &str = "\
Examples:
  # Save a schema under the topic's value subject (greetings-value)
  protopipe schema save --schema-file addressbook.proto --topic greetings

  # Point at a different registry
  protopipe schema save --schema-file addressbook.proto --topic greetings --url http://localhost:18081

  # Register under the key subject (greetings-key) instead
  protopipe schema save --schema-file addressbook.proto --topic greetings --for-key";

const SCHEMA_DELETE_EXAMPLES: &str = "\
Examples:
  # Delete every version of a subject
  protopipe schema delete --subject greetings-value

  # Delete one version only
  protopipe schema delete --subject greetings-value --version 1";

const PRODUCE_EXAMPLES: &str = "\
Examples:
  # Send a record to the default topic
  protopipe produce --data-file person.json

  # Send to another topic
  protopipe produce --data-file person.json --topic phonebook

  # Use a custom broker list
  protopipe produce --data-file person.json --seeds broker-1:19092 --seeds broker-2:19092";

const CONSUME_EXAMPLES: &str = "\
Examples:
  # Print records from the default topic
  protopipe consume

  # Read another topic with a dedicated group
  protopipe consume --topic phonebook --group-id phonebook-readers";

#[derive(Parser, Debug)]
#[command(
    name = "protopipe",
    version,
    about = "Register Protobuf schemas and move address book records through a broker"
)]
pub struct Cli {
    /// Logging level (e.g. info, debug, or a filter directive)
    #[arg(short, long, global = true, default_value = "info")]
    pub verbose: String,

    /// Schema registry API URL
    #[arg(short = 'l', long, global = true, default_value = "http://localhost:18081")]
    pub url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Schema registry operations
    #[command(subcommand)]
    Schema(SchemaCommands),
    /// Send one address book record to a topic
    #[command(after_help = PRODUCE_EXAMPLES)]
    Produce(ProduceArgs),
    /// Print address book records from a topic as they arrive
    #[command(after_help = CONSUME_EXAMPLES)]
    Consume(ConsumeArgs),
}

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// Upload a schema for a topic's value (or key) subject
    #[command(after_help = SCHEMA_SAVE_EXAMPLES)]
    Save(SchemaSaveArgs),
    /// Delete a subject, or one version of it
    #[command(after_help = SCHEMA_DELETE_EXAMPLES)]
    Delete(SchemaDeleteArgs),
}

#[derive(Args, Debug)]
pub struct SchemaSaveArgs {
    /// Topic whose subject the schema registers under
    #[arg(short, long)]
    pub topic: String,

    /// Path to the schema file
    #[arg(short = 'f', long)]
    pub schema_file: PathBuf,

    /// Register for the record key subject instead of the value subject
    #[arg(short = 'k', long)]
    pub for_key: bool,
}

#[derive(Args, Debug)]
pub struct SchemaDeleteArgs {
    /// Subject name to delete
    #[arg(short = 'n', long)]
    pub subject: String,

    /// Delete only this version; omit to delete every version
    #[arg(long)]
    pub version: Option<String>,
}

#[derive(Args, Debug)]
pub struct ProduceArgs {
    /// Topic to send the record to
    #[arg(short, long, default_value = "addressbook")]
    pub topic: String,

    /// Path to the record JSON file
    #[arg(short = 'f', long)]
    pub data_file: PathBuf,

    /// Broker seed address; repeat for multiple brokers
    #[arg(short, long, default_value = "localhost:19092")]
    pub seeds: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ConsumeArgs {
    /// Topic to read records from
    #[arg(short, long, default_value = "addressbook")]
    pub topic: String,

    /// Consumer group id
    #[arg(short, long, default_value = "my-addressbook-group")]
    pub group_id: String,

    /// Broker seed address; repeat for multiple brokers
    #[arg(short, long, default_value = "localhost:19092")]
    pub seeds: Vec<String>,
}

/// Dispatch the parsed command. Errors bubble up; the binary decides how to
/// exit.
pub async fn run(cli: Cli) -> Result<(), PipeError> {
    match cli.command {
        Commands::Schema(schema_cmd) => handle_schema_command(&cli.url, schema_cmd).await,
        Commands::Produce(args) => handle_produce(args).await,
        Commands::Consume(args) => handle_consume(args).await,
    }
}

async fn handle_schema_command(url: &str, schema_cmd: SchemaCommands) -> Result<(), PipeError> {
    let client = SchemaRegistryClient::new(url);
    match schema_cmd {
        SchemaCommands::Save(args) => {
            let schema = load_schema(&args.schema_file)?;
            let subject = subject_for_topic(&args.topic, args.for_key);
            let response = client.register_schema(&subject, &schema).await?;
            info!(schema_id = response.id, subject = %subject, "Saved schema");
            Ok(())
        }
        SchemaCommands::Delete(args) => match args.version {
            Some(version) => {
                let deleted = client.delete_version(&args.subject, &version).await?;
                info!(subject = %args.subject, version = deleted, "Deleted subject version");
                Ok(())
            }
            None => {
                let deleted = client.delete_subject(&args.subject).await?;
                info!(subject = %args.subject, versions = ?deleted, "Deleted subject");
                Ok(())
            }
        },
    }
}

async fn handle_produce(args: ProduceArgs) -> Result<(), PipeError> {
    let person = load_person(&args.data_file)?;
    let producer = RecordProducer::connect(&args.seeds)?;
    let (partition, offset) = producer.send(&args.topic, &person).await?;
    info!(partition, offset, "Saved record");
    Ok(())
}

async fn handle_consume(args: ConsumeArgs) -> Result<(), PipeError> {
    let consumer = TopicConsumer::connect(&args.seeds, &args.group_id, &args.topic)?;
    consumer.run().await
}

fn load_schema(path: &Path) -> Result<String, PipeError> {
    fs::read_to_string(path)
        .map_err(|e| PipeError::from_io_error(e, &format!("schema file {}", path.display())))
}

fn load_person(path: &Path) -> Result<Person, PipeError> {
    let context = format!("record file {}", path.display());
    let bytes = fs::read(path).map_err(|e| PipeError::from_io_error(e, &context))?;
    debug!(data = %String::from_utf8_lossy(&bytes), "Record file contents");
    Person::from_json_slice(&bytes, &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_person_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"id":1,"name":"Ada","email":"ada@example.com"}"#)
            .unwrap();

        let person = load_person(file.path()).unwrap();
        assert_eq!(person.id, 1);
        assert_eq!(person.key(), "1");
    }

    #[test]
    fn test_load_person_missing_file() {
        let result = load_person(Path::new("/nonexistent/person.json"));
        match result {
            Err(PipeError::Io { context, .. }) => {
                assert!(context.contains("/nonexistent/person.json"));
            }
            other => panic!("Expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_person_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();

        let result = load_person(file.path());
        assert!(matches!(result, Err(PipeError::InvalidRecord { .. })));
    }

    #[test]
    fn test_load_schema_reads_text() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"syntax = \"proto3\";").unwrap();

        let schema = load_schema(file.path()).unwrap();
        assert_eq!(schema, "syntax = \"proto3\";");
    }
}
