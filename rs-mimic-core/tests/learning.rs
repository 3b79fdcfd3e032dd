use std::time::Duration;

use rs_mimic_core::config::LearningConfig;
use rs_mimic_core::learning::{Learner, Progress};
use rs_mimic_core::model::chain::ChainModel;
use rs_mimic_core::model::imitator::{Imitator, WalkState};
use rs_mimic_core::scheduler::{FixedBudgetHost, StepHost};

const COMPANIES: &str = "Cogip\nFloteo\nSoprotec\nSogefrap\nBotea\nMireo\nCofrap\nSogiflup\n";

fn small_chunks() -> Learner {
	let mut config = LearningConfig::default();
	config.set_lines_per_chunk(2).unwrap();
	config.set_matches_per_chunk(5).unwrap();
	Learner::new(config)
}

#[test]
fn background_learning_matches_direct_build() {
	let learned = small_chunks().learn_with(COMPANIES, &mut StepHost::new(1).unwrap(), |_| {}).unwrap();
	assert_eq!(learned.chain, ChainModel::build_from_text(COMPANIES));
	assert_eq!(learned.lines, 8);
	// One match per character plus one for END.
	let expected: usize = COMPANIES.lines().map(|l| l.chars().count() + 1).sum();
	assert_eq!(learned.matches, expected);
}

#[test]
fn progress_rises_and_completes() {
	let mut reports: Vec<Progress> = Vec::new();
	small_chunks()
		.learn_with(COMPANIES, &mut StepHost::new(1).unwrap(), |p| reports.push(p.clone()))
		.unwrap();

	let last = reports.last().unwrap();
	assert!(last.is_completed);
	assert_eq!(last.percent_complete, 100.0);

	let pending: Vec<&Progress> = reports.iter().filter(|p| !p.is_completed).collect();
	// 8 lines in chunks of 2: 3 reports before the last split chunk settles the pass.
	assert_eq!(pending.iter().filter(|p| p.label == "Reading examples").count(), 3);
	assert!(pending.iter().any(|p| p.label == "Building chain"));
	assert!(pending.windows(2).all(|w| w[0].percent_complete <= w[1].percent_complete));
	assert!(pending.iter().all(|p| p.percent_complete < 100.0));
}

#[test]
fn zero_budget_learning_settles() {
	let mut host = FixedBudgetHost::new(Duration::ZERO, Duration::ZERO);
	let learned = small_chunks().learn_with("abc\ndef", &mut host, |_| {}).unwrap();
	assert_eq!(learned.chain, ChainModel::build_from_text("abc\ndef"));
}

#[test]
fn blank_text_learns_an_empty_chain() {
	let learned = Learner::default().learn_blocking("  \n\n ", |_| {}).unwrap();
	assert!(learned.chain.is_empty());
	assert_eq!(learned.lines, 0);

	let mut imitator = Imitator::new(learned.chain, 0);
	assert_eq!(imitator.imitate(1, 3).unwrap(), "!");
}

#[tokio::test]
async fn async_learning_feeds_the_imitator() {
	let learned = small_chunks()
		.learn_async(COMPANIES, &mut StepHost::new(3).unwrap(), |_| {}, tokio::task::yield_now)
		.await
		.unwrap();

	let mut imitator = Imitator::new(learned.chain, 2024);
	for _ in 0..50 {
		let imitation = imitator.imitate_detailed(4, 12).unwrap();
		assert!(imitation.text.chars().count() <= 12);
		assert_ne!(imitation.ending, WalkState::Walking);
		assert!(!imitation.to_string().is_empty());
	}
}
