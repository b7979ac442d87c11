//! `formbind-bind`: bind a field template against a record.
//!
//! Usage:
//!   formbind-bind < document.json
//!
//! The document is `{"template": [...], "record": {...}}`. Set `RUST_LOG`
//! to see binding warnings on stderr.

use formbind::form_cli::bind_document;
use formbind::registry::FieldRegistry;
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match bind_document(buf.trim(), &FieldRegistry::with_builtins()) {
        Ok(result) => {
            let mut stdout = io::stdout();
            if let Err(e) = stdout
                .write_all(result.as_bytes())
                .and_then(|()| stdout.write_all(b"\n"))
            {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
