pub mod slack_signature;
