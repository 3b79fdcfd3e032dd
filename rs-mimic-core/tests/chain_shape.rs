use rs_mimic_core::model::chain::{ChainError, ChainModel};
use rs_mimic_core::model::symbol::{Match, Symbol};
use serde_json::json;

#[test]
fn fold_examples_serialize_to_weight_objects() {
	let x = Symbol::Char('X');
	let once = ChainModel::new().fold(Match::new(x, Symbol::Char('Y')));
	assert_eq!(serde_json::to_value(&once).unwrap(), json!({ "X": { "Y": { "weight": 1 } } }));

	let twice = once.clone().fold(Match::new(x, Symbol::Char('Y')));
	assert_eq!(serde_json::to_value(&twice).unwrap(), json!({ "X": { "Y": { "weight": 2 } } }));

	let branched = once.clone().fold(Match::new(x, Symbol::Char('Z')));
	assert_eq!(
		serde_json::to_value(&branched).unwrap(),
		json!({ "X": { "Y": { "weight": 1 }, "Z": { "weight": 1 } } })
	);
}

#[test]
fn sentinels_use_control_character_keys() {
	let chain = ChainModel::build_from_text("a");
	assert_eq!(
		serde_json::to_value(&chain).unwrap(),
		json!({ "\u{2}": { "a": { "weight": 1 } }, "a": { "\u{3}": { "weight": 1 } } })
	);
}

#[test]
fn chain_round_trips_through_json() {
	let chain = ChainModel::build_from_text("Cogip\nFloteo\nSoprotec\nSogefrap");
	let json = serde_json::to_string(&chain).unwrap();
	let parsed: ChainModel = serde_json::from_str(&json).unwrap();
	assert_eq!(parsed, chain);

	// Folding keeps working on a parsed chain.
	let folded = parsed.fold(Match::new(Symbol::Char('C'), Symbol::Char('o')));
	assert_eq!(folded.weight(Symbol::Char('C'), Symbol::Char('o')), 2);
}

#[test]
fn invalid_shapes_are_rejected() {
	let zero = json!({ "a": { "b": { "weight": 0 } } });
	assert!(serde_json::from_value::<ChainModel>(zero).is_err());

	let long_key = json!({ "ab": { "c": { "weight": 1 } } });
	assert!(serde_json::from_value::<ChainModel>(long_key).is_err());

	let empty_premise = json!({ "a": {} });
	assert!(serde_json::from_value::<ChainModel>(empty_premise).is_err());

	let end_premise = json!({ "\u{3}": { "a": { "weight": 1 } } });
	let err = serde_json::from_value::<ChainModel>(end_premise).unwrap_err();
	assert!(err.to_string().contains(&ChainError::EndAsPremise.to_string()));
}
