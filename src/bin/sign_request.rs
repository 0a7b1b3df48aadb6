//! Print HMAC headers for a request to the internal tenant API
//!
//! Usage:
//!   cargo run --bin sign_request -- --key-id svc-billing --path /internal/v1/tenants \
//!       --body '{"tenant_uuid":"t-1"}'
//!
//! Options:
//!   --key-id <id>        key id (required)
//!   --secret <secret>    shared secret, falls back to TENANT_GATE_SIGNING_SECRET
//!   --method <method>    HTTP method, default POST
//!   --path <path>        request path, default /internal/v1/tenants
//!   --body <json>        request body, default empty
//!   --body-file <file>   read the body from a file
//!   --timestamp <secs>   unix seconds, default now
//!   --nonce <nonce>      nonce, default a fresh UUID v4
//!   --no-nonce           omit the nonce header
//!   --json               print headers as a JSON object

use anyhow::{Context, bail};

const SECRET_ENV: &str = "TENANT_GATE_SIGNING_SECRET";

fn get_arg(args: &[String], name: &str) -> Option<String> {
    for i in 0..args.len() {
        if args[i] == name && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let Some(key_id) = get_arg(&args, "--key-id") else {
        bail!("--key-id is required");
    };
    let secret = match get_arg(&args, "--secret") {
        Some(secret) => secret,
        None => std::env::var(SECRET_ENV)
            .with_context(|| format!("pass --secret or set {}", SECRET_ENV))?,
    };
    let method = get_arg(&args, "--method").unwrap_or_else(|| "POST".to_string());
    let path = get_arg(&args, "--path").unwrap_or_else(|| "/internal/v1/tenants".to_string());

    let body = match (get_arg(&args, "--body"), get_arg(&args, "--body-file")) {
        (Some(_), Some(_)) => bail!("--body and --body-file are mutually exclusive"),
        (Some(body), None) => body.into_bytes(),
        (None, Some(file)) => {
            std::fs::read(&file).with_context(|| format!("Failed to read body file: {}", file))?
        }
        (None, None) => Vec::new(),
    };

    let timestamp = match get_arg(&args, "--timestamp") {
        Some(ts) => ts,
        None => chrono::Utc::now().timestamp().to_string(),
    };
    let nonce = if has_flag(&args, "--no-nonce") {
        None
    } else {
        Some(get_arg(&args, "--nonce").unwrap_or_else(|| uuid::Uuid::new_v4().to_string()))
    };

    let signed = tenant_gate::sign_request(
        &key_id,
        secret.as_bytes(),
        &method,
        &path,
        &body,
        &timestamp,
        nonce.as_deref(),
    );

    if has_flag(&args, "--json") {
        let map: serde_json::Map<String, serde_json::Value> = signed
            .header_pairs()
            .into_iter()
            .map(|(name, value)| (name.to_string(), serde_json::Value::String(value)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        for (name, value) in signed.header_pairs() {
            println!("{}: {}", name, value);
        }
    }
    Ok(())
}
