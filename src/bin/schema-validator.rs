//! # Schema Document Validator
//!
//! A command-line utility that checks files of RFC 4512 schema descriptions against the
//! built-in `system` and `core` schemas.
//!
//! ## Overview
//!
//! Every file is decoded and registered into one bootstrap catalog, so a later file may
//! use definitions of an earlier one. The validator reports:
//! - Definitions that fail to parse, with the line they start on
//! - OID collisions and name conflicts with already loaded definitions
//! - References (superiors, matching rules, syntaxes) that resolve to nothing
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin schema-validator schemas/inetorgperson.schema
//! cargo run --bin schema-validator ./schemas/
//! cargo run --bin schema-validator --json ./schemas/
//! ```
//!
//! Directories are scanned for `*.schema` files in name order.
//!
//! ## Output Example
//!
//! ```text
//! Validating: schemas/shop.schema
//!   ✓ 3 definitions
//!     - attribute type 1.3.6.1.4.1.42.1 (shoeSize) in schema 'shop'
//!
//! Validation Summary:
//!   Valid files: 1
//!   Invalid files: 0
//! ```

use ldap_schema::registries::ObjectRef;
use ldap_schema::{Registries, load_schema_document};
use serde_json::json;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let mut args: Vec<String> = env::args().collect();
    let json_output = match args.iter().position(|arg| arg == "--json") {
        Some(index) => {
            args.remove(index);
            true
        }
        None => false,
    };

    if args.len() < 2 {
        eprintln!("Usage: {} [--json] <schema-file-or-directory>", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} schemas/shop.schema", args[0]);
        eprintln!("  {} ./schemas/", args[0]);
        process::exit(1);
    }

    let path = Path::new(&args[1]);
    let files = if path.is_file() {
        vec![path.to_path_buf()]
    } else if path.is_dir() {
        match schema_files(path) {
            Ok(files) => files,
            Err(e) => {
                eprintln!("Error reading directory: {}", e);
                process::exit(1);
            }
        }
    } else {
        eprintln!(
            "Error: '{}' is not a valid file or directory",
            path.display()
        );
        process::exit(1);
    };

    let registries = match Registries::bootstrap() {
        Ok(registries) => registries,
        Err(e) => {
            eprintln!("❌ Failed to load the bootstrap schemas: {}", e);
            process::exit(1);
        }
    };

    let mut report = Vec::new();
    let mut error_count = 0;
    for file in &files {
        if !json_output {
            println!("Validating: {}", file.display());
        }
        match validate_file(&registries, file) {
            Ok(loaded) => {
                if !json_output {
                    println!("  ✓ {} definitions", loaded.len());
                    for object in &loaded {
                        println!("    - {}", describe(&registries, object));
                    }
                }
                report.push(json!({
                    "file": file.display().to_string(),
                    "valid": true,
                    "definitions": loaded.iter().map(|o| o.to_string()).collect::<Vec<_>>(),
                }));
            }
            Err(e) => {
                if !json_output {
                    eprintln!("  ❌ Invalid - {}", e);
                }
                report.push(json!({
                    "file": file.display().to_string(),
                    "valid": false,
                    "error": e,
                }));
                error_count += 1;
            }
        }
    }

    if json_output {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Error writing report: {}", e),
        }
    } else {
        println!("\nValidation Summary:");
        println!("  Valid files: {}", files.len() - error_count);
        println!("  Invalid files: {}", error_count);
    }

    if error_count > 0 {
        process::exit(1);
    }
}

fn schema_files(dir_path: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir_path)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("schema"))
        .collect();
    files.sort();
    Ok(files)
}

/// Load one file and check that everything it defines resolves.
fn validate_file(registries: &Registries, file_path: &Path) -> Result<Vec<ObjectRef>, String> {
    let content = fs::read_to_string(file_path).map_err(|e| e.to_string())?;
    let loaded = load_schema_document(registries, &content).map_err(|e| e.to_string())?;

    let mut unresolved = Vec::new();
    for object in &loaded {
        let definition = registries
            .lookup_any(object.kind, &object.oid)
            .map_err(|e| e.to_string())?;
        for reference in definition.references() {
            if registries.lookup_any(reference.kind, &reference.id).is_err() {
                unresolved.push(format!("{} -> {} '{}'", object, reference.kind, reference.id));
            }
        }
    }
    if !unresolved.is_empty() {
        return Err(format!("unresolved references: {}", unresolved.join("; ")));
    }
    Ok(loaded)
}

fn describe(registries: &Registries, object: &ObjectRef) -> String {
    let name = registries
        .lookup_any(object.kind, &object.oid)
        .map(|definition| definition.name().to_string())
        .unwrap_or_default();
    format!("{} ({}) in schema '{}'", object, name, object.schema_name)
}
