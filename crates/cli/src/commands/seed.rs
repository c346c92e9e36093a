use kiosk_db::{CanteenSeedDataset, VerificationResult};

use crate::commands::{run_with_database, CommandResult, StepError};

pub fn run() -> CommandResult {
    let outcome = run_with_database("seed", |_config, pool| async move {
        let seeded = CanteenSeedDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = CanteenSeedDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;
        if !verification.all_present {
            return Err(("seed_verification", verification_failure_message(&verification), 6u8));
        }

        Ok::<_, StepError>(seeded)
    });

    match outcome {
        Ok(seeded) => CommandResult::success(
            "seed",
            format!(
                "canteen seed loaded: {} products ({} kept their stock), {} users: {}",
                seeded.products_upserted.len(),
                seeded.stock_preserved,
                seeded.users_added.len(),
                seeded.users_added.join(", ")
            ),
        ),
        Err(result) => result,
    }
}

fn verification_failure_message(verification: &VerificationResult) -> String {
    let failed_checks = verification
        .checks
        .iter()
        .filter_map(|(check, passed)| (!passed).then_some(*check))
        .collect::<Vec<_>>();

    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use kiosk_db::VerificationResult;

    use super::verification_failure_message;

    #[test]
    fn verification_message_names_missing_records() {
        let verification = VerificationResult {
            all_present: false,
            checks: vec![("Coffee", true), ("Tea", false), ("ADMIN001", false)],
        };

        assert_eq!(
            verification_failure_message(&verification),
            "Seed verification failed for: Tea, ADMIN001"
        );
    }

    #[test]
    fn verification_message_falls_back_to_generic_when_no_labels() {
        let verification = VerificationResult { all_present: false, checks: Vec::new() };

        assert_eq!(verification_failure_message(&verification), "Some seed data failed to load");
    }
}
