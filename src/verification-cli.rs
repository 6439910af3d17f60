//! A simple CLI tool for checking Merkle inclusion proofs offline.
//! This uses the server's own verification, and is by definition compatible
//! with the proofs returned by our API endpoints.

use std::fs::File;
use std::io::BufReader;

use clap::{Arg, ArgAction, ArgMatches, Command};
use rocket::serde::json::serde_json;
use serde::Deserialize;

use vote_integrity::merkle::{verify_many, Proof};

const PROGRAM_NAME: &str = "verify-inclusion";

const ABOUT_TEXT: &str = "Verify that vote commitments are included in a published Merkle root.

EXIT CODES:
     0: Every proof is valid.
   255: Ran successfully, but at least one proof is invalid.
 Other: Error.";

const PROOF_PATH: &str = "PROOF_PATH";

const PROOF_PATH_HELP: &str = "The path to a JSON proof or list of proofs,\n\
as returned by `GET /elections/<election_id>/merkle/proof/<vote_hash>`\n\
or `POST /elections/<election_id>/merkle/proofs`";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME).about(ABOUT_TEXT).arg(
        Arg::new(PROOF_PATH)
            .help(PROOF_PATH_HELP)
            .action(ArgAction::Set)
            .required(true),
    )
}

/// Errors that this program may produce.
#[derive(Debug, Eq, PartialEq)]
enum Error {
    /// IO error described by the inner message.
    IO(String),
    /// Failed to decode the JSON file.
    Format(String),
}

/// Either shape the API hands out.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProofFile {
    One(Proof),
    Many(Vec<Proof>),
}

/// Load the proofs and check each one, returning them alongside their validity.
fn verify(path: &str) -> Result<Vec<(Proof, bool)>, Error> {
    let file = BufReader::new(File::open(path).map_err(|e| Error::IO(e.to_string()))?);
    let proofs = match serde_json::from_reader(file).map_err(|e| Error::Format(e.to_string()))? {
        ProofFile::One(proof) => vec![proof],
        ProofFile::Many(proofs) => proofs,
    };

    let valid = verify_many(&proofs);
    Ok(proofs.into_iter().zip(valid).collect())
}

/// Run verification, report the result, and return the exit code.
fn run(args: &ArgMatches) -> u8 {
    let path: &String = args.get_one(PROOF_PATH).unwrap(); // Required argument is guaranteed to be present.
    match verify(path) {
        Ok(results) => {
            for (proof, valid) in &results {
                let verdict = if *valid { "VALID" } else { "INVALID" };
                println!("{verdict}: {} under root {}", proof.leaf, proof.root);
            }
            let invalid = results.iter().filter(|(_, valid)| !valid).count();
            if invalid == 0 {
                println!("Verification succeeded.");
                0
            } else {
                println!(
                    "Verification failed: {invalid} of {} proof{} invalid.",
                    results.len(),
                    if results.len() != 1 { "s" } else { "" }
                );
                255
            }
        }
        Err(Error::IO(msg)) => {
            println!("IO error: {}", msg);
            1
        }
        Err(Error::Format(msg)) => {
            println!("Invalid JSON: {}", msg);
            1
        }
    }
}

fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validity(path: &str) -> Result<Vec<bool>, Error> {
        verify(path).map(|results| results.into_iter().map(|(_, valid)| valid).collect())
    }

    #[test]
    fn verification() {
        // This test actually enters backend code, so enable logging.
        log4rs_test_utils::test_logging::init_logging_once_for(["vote_integrity"], None, None);

        assert_eq!(validity("example_proofs/proof.json"), Ok(vec![true]));
        assert_eq!(
            validity("example_proofs/batch.json"),
            Ok(vec![true, true, true])
        );
        assert_eq!(
            validity("example_proofs/batch_tampered.json"),
            Ok(vec![true, false, true])
        );
        assert!(matches!(
            verify("example_proofs/malformed.json"),
            Err(Error::Format(_))
        ));
        assert!(matches!(verify("not a real file"), Err(Error::IO(_))));
    }

    #[test]
    fn correct_cli_usage() {
        let command_line = [PROGRAM_NAME, "example_proofs/batch.json"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 0);

        let command_line = [PROGRAM_NAME, "example_proofs/batch_tampered.json"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 255);

        let command_line = [PROGRAM_NAME, "example_proofs/malformed.json"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 1);

        let command_line = [PROGRAM_NAME, "not a real file"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 1);
    }

    #[test]
    fn bad_cli_usage() {
        // Something very wrong.
        let command_line = [PROGRAM_NAME, "this", "invocation", "is", "incorrect"];
        cli().try_get_matches_from(command_line).unwrap_err();

        // No options at all.
        let command_line = [PROGRAM_NAME];
        cli().try_get_matches_from(command_line).unwrap_err();
    }
}
