//! The interactive menu and its actions.

use anyhow::{bail, Context, Result};
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use attestgate::core::conditions::{AccessCondition, ConditionNode, Operator};
use attestgate::core::{AttestationUid, EncryptedEnvelope, FieldMap, SchemaUid, Value};
use attestgate::{AttestOptions, Client, ResolveOptions};

use crate::presets;
use crate::proof::AnonAadhaarProof;

const MENU: &[&str] = &[
    "Create Schema",
    "Resolve Schema",
    "Create Gated Attestation",
    "Resolve Gated Attestation",
    "Revoke Attestation",
    "Exit",
];

/// Line-oriented prompting over stdin.
pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn line(&mut self, label: &str) -> Result<String> {
        print!("{label} ");
        std::io::stdout().flush()?;
        match self.lines.next_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => bail!("input closed"),
        }
    }

    async fn nonempty(&mut self, label: &str) -> Result<String> {
        loop {
            let line = self.line(label).await?;
            if !line.is_empty() {
                return Ok(line);
            }
            println!("A value is required.");
        }
    }

    /// Numbered selection from a list of labels.
    async fn choose(&mut self, label: &str, options: &[&str]) -> Result<usize> {
        println!("{label}");
        for (i, option) in options.iter().enumerate() {
            println!("  {}) {option}", i + 1);
        }
        loop {
            let line = self.line(">").await?;
            match line.parse::<usize>() {
                Ok(n) if n >= 1 && n <= options.len() => return Ok(n - 1),
                _ => println!("Enter a number between 1 and {}.", options.len()),
            }
        }
    }

    async fn confirm(&mut self, label: &str) -> Result<bool> {
        loop {
            let line = self.line(&format!("{label} [y/N]")).await?;
            match line.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "" | "n" | "no" => return Ok(false),
                _ => println!("Answer y or n."),
            }
        }
    }
}

/// Run the main menu until the user exits.
///
/// Action errors are printed and the menu continues; only an input failure
/// ends the loop.
pub async fn menu_loop(client: &Client) -> Result<()> {
    let mut prompt = Prompt::new();
    loop {
        println!();
        let choice = match prompt.choose("Select an action:", MENU).await {
            Ok(choice) => choice,
            // stdin closed: treat like a graceful exit
            Err(_) => return Ok(()),
        };
        let result = match choice {
            0 => create_schema(client, &mut prompt).await,
            1 => resolve_schema(client, &mut prompt).await,
            2 => create_gated_attestation(client, &mut prompt).await,
            3 => resolve_gated_attestation(client, &mut prompt).await,
            4 => revoke_attestation(client, &mut prompt).await,
            _ => {
                println!("Exiting...");
                return Ok(());
            }
        };
        if let Err(err) = result {
            println!("error: {err:#}");
        }
    }
}

async fn create_schema(client: &Client, prompt: &mut Prompt) -> Result<()> {
    let name = prompt.line("Enter schema name:").await?;
    let schema = prompt
        .nonempty("Enter schema (comma-separated \"type name\" pairs):")
        .await?;

    println!("Creating schema: {name}");
    let uid = client.register_schema(&schema).await?;
    println!("Schema created: {uid}");
    Ok(())
}

async fn resolve_schema(client: &Client, prompt: &mut Prompt) -> Result<()> {
    let uid = prompt_schema_uid(prompt).await?;
    println!("Resolving schema {uid}");
    let descriptor = client.get_schema(&uid).await?;
    println!("{}", descriptor.schema);
    Ok(())
}

async fn create_gated_attestation(client: &Client, prompt: &mut Prompt) -> Result<()> {
    let uid = prompt_schema_uid(prompt).await?;
    let descriptor = client.get_schema(&uid).await?;
    println!("Schema: {}", descriptor.schema);

    // Prompt a value for every declared field.
    let fields = descriptor.fields()?;
    let mut data = FieldMap::new();
    for field in fields {
        loop {
            let raw = prompt
                .line(&format!("Enter value for {} ({}):", field.name, field.ty))
                .await?;
            match Value::from_text(field.ty, &raw) {
                Ok(value) => {
                    data.insert(field.name.clone(), value);
                    break;
                }
                Err(err) => println!("{err}"),
            }
        }
    }

    let conditions = build_conditions(prompt).await?;
    println!("Selected access conditions:");
    println!(
        "{}",
        serde_json::to_string_pretty(&conditions).context("rendering conditions")?
    );

    println!("Creating attestation...");
    let uid = client
        .create_attestation(&data, uid, AttestOptions::gated(conditions))
        .await?;
    println!("Attestation created: {uid}");
    Ok(())
}

/// Interactive condition builder: pick presets, join them with and/or.
async fn build_conditions(prompt: &mut Prompt) -> Result<Vec<ConditionNode>> {
    let mut remaining = presets::catalogue();
    let mut nodes: Vec<ConditionNode> = Vec::new();

    loop {
        let labels: Vec<&str> = remaining.iter().map(|p| p.name).collect();
        let index = prompt
            .choose("Select an access control condition:", &labels)
            .await?;
        let preset = remaining.remove(index);
        let mut condition = (preset.condition)();

        if preset.name.contains("AnonAadhaar") {
            let raw = prompt.nonempty("Paste your Aadhaar ZK proof:").await?;
            let proof = AnonAadhaarProof::parse(&raw)?;
            if let AccessCondition::EvmContract {
                function_params, ..
            } = &mut condition
            {
                *function_params = proof.resources();
            }
        } else if preset.name.contains("Timelock") {
            let minutes: u64 = prompt
                .nonempty("How many minutes should this data stay locked:")
                .await?
                .parse()
                .context("minutes must be a whole number")?;
            let unlock_at = now_secs() + minutes * 60;
            if let AccessCondition::EvmBasic {
                return_value_test, ..
            } = &mut condition
            {
                return_value_test.value = unlock_at.to_string();
            }
        }

        nodes.push(ConditionNode::Condition(condition));

        if remaining.is_empty() || !prompt.confirm("Add another condition?").await? {
            return Ok(nodes);
        }

        let operator = match prompt
            .choose("Combine with:", &["AND", "OR"])
            .await?
        {
            0 => Operator::And,
            _ => Operator::Or,
        };
        nodes.push(ConditionNode::operator(operator));
    }
}

async fn resolve_gated_attestation(client: &Client, prompt: &mut Prompt) -> Result<()> {
    let uid = prompt_attestation_uid(prompt).await?;

    println!("Verifying gated attestation...");
    // First pass without decryption: show what must be satisfied.
    let raw = client.get_attestation(uid, ResolveOptions::default()).await?;
    let envelope = EncryptedEnvelope::from_field_map(&raw.decoded_data)?;
    println!("The following conditions must be satisfied:");
    let nodes = envelope.condition_nodes()?;
    println!("{}", serde_json::to_string_pretty(&nodes)?);

    let resolved = client.get_attestation(uid, ResolveOptions::gated()).await?;
    println!("Attestation resolved:");
    println!("{}", serde_json::to_string_pretty(&resolved.decoded_data)?);
    Ok(())
}

async fn revoke_attestation(client: &Client, prompt: &mut Prompt) -> Result<()> {
    let uid = prompt_attestation_uid(prompt).await?;
    let reason = prompt.line("Enter reason for revocation:").await?;

    println!("Revoking attestation...");
    let revoked = client.revoke_attestation(uid, Some(&reason)).await?;
    println!("Attestation revoked: {revoked}");
    Ok(())
}

async fn prompt_schema_uid(prompt: &mut Prompt) -> Result<SchemaUid> {
    let raw = prompt.nonempty("Enter schema ID:").await?;
    SchemaUid::from_hex(&raw).context("schema ID must be 32 bytes of hex")
}

async fn prompt_attestation_uid(prompt: &mut Prompt) -> Result<AttestationUid> {
    let raw = prompt.nonempty("Enter attestation ID:").await?;
    AttestationUid::from_hex(&raw).context("attestation ID must be 32 bytes of hex")
}

fn now_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_secs()
}
