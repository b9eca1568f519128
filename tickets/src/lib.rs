//! Ticket routing data: CSV loading, label encoding and the yes/no answer interface used by
//! the `tickets` binary.
pub mod answers;
pub mod encoding;
mod error;
pub mod label_encoder;
pub mod ticket_table;

pub use answers::{Answer, complete_answers, encode_answers, parse_assignment};
pub use encoding::{EncodedTickets, Split, Task, days_to_resolve, one_hot};
pub use error::{Result, TicketError};
pub use label_encoder::{EncoderMode, LabelEncoder, LabelMapping};
pub use ticket_table::{FEATURE_COLUMNS, LABEL_COLUMN, TicketTable};

#[cfg(test)]
mod tests {
    use super::*;
    use neural_network::NetworkConfig;
    use training::{FileCheckpoint, Preset, Trainer, TrainingConfig};

    fn tickets_csv() -> String {
        let mut csv = format!("{},{}\n", FEATURE_COLUMNS.join(","), LABEL_COLUMN);
        for i in 0..24 {
            let wireless = if i % 2 == 0 { "Yes" } else { "No" };
            let printing = if i % 2 == 0 { "No" } else { "Yes" };
            let team = if i % 2 == 0 { "Networks" } else { "Printing" };
            // uninformative columns still need both values for the stored encoders
            let noise = if i % 3 == 0 { "Yes" } else { "No" };
            let row = [
                noise, noise, noise, noise, wireless, printing, noise, noise, noise, team,
            ];
            csv.push_str(&row.join(","));
            csv.push('\n');
        }
        csv
    }

    #[test]
    fn test_train_restore_and_predict() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let temp = assert_fs::TempDir::new()?;
        let table = TicketTable::from_reader(tickets_csv().as_bytes())?;
        let encoder = LabelEncoder::new(temp.path());
        let encoded =
            EncodedTickets::from_table(&table, &encoder, EncoderMode::Fit, Task::Classification)?;
        let split = encoded.split(0.25, 0.0, 5)?;

        let network_config = NetworkConfig {
            hidden_nodes: 6,
            seed: Some(2),
            ..Preset::ClassificationBasic.network_config()
        };
        let training_config = TrainingConfig {
            epochs: 200,
            stop_below: None,
            show_progress: false,
            shuffle_seed: Some(1),
            ..Preset::ClassificationBasic.training_config()
        };
        let checkpoint = temp.path().join(Preset::ClassificationBasic.checkpoint_file_name());
        let mut trainer = Trainer::new(
            &network_config,
            training_config.clone(),
            split.train,
            Some(split.validation),
            Box::new(FileCheckpoint::new(&checkpoint)),
        )?;
        let history = trainer.train_minibatch()?;
        assert!(history.checkpoints_written > 0);

        let restored = Trainer::restore(&network_config, training_config, &checkpoint)?;
        let answers = complete_answers(
            &[
                ("Wireless".to_owned(), Answer::Yes),
                ("Printing".to_owned(), Answer::No),
            ],
            &encoded.feature_means(),
        )?;
        let output = restored.predict(&encode_answers(&answers, &encoder)?)?;
        let team = encoder.decode(output.argmax_rows()[0], LABEL_COLUMN)?;

        assert_eq!(team, "Networks");
        Ok(())
    }
}
