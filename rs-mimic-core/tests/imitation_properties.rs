use proptest::prelude::*;
use rs_mimic_core::model::chain::ChainModel;
use rs_mimic_core::model::imitator::{CLEAN_MARKER, Imitator, NO_PATH_MARKER, PREMATURE_MARKER, WalkState};

fn examples() -> impl Strategy<Value = String> {
	prop::collection::vec("[a-f]{0,10}", 0..10).prop_map(|lines| lines.join("\n"))
}

fn bounds() -> impl Strategy<Value = (usize, usize)> {
	(1usize..20).prop_flat_map(|max| (0..=max, Just(max)))
}

proptest! {
	#[test]
	fn imitations_respect_bounds_and_markers(
		text in examples(),
		seed in any::<u32>(),
		(min, max) in bounds(),
	) {
		let mut imitator = Imitator::new(ChainModel::build_from_text(&text), seed);

		for _ in 0..8 {
			let imitation = imitator.imitate_detailed(min, max).unwrap();
			let rendered = imitation.to_string();

			prop_assert!(imitation.text.chars().count() <= max);
			prop_assert!(!rendered.is_empty());
			prop_assert!(rendered.starts_with(&imitation.text));

			let marker = &rendered[imitation.text.len()..];
			match imitation.ending {
				WalkState::Walking => prop_assert!(false, "walk returned while still walking"),
				WalkState::EndedClean => prop_assert_eq!(marker, CLEAN_MARKER),
				WalkState::EndedPremature => prop_assert_eq!(marker, PREMATURE_MARKER),
				WalkState::EndedNoPath => prop_assert_eq!(marker, NO_PATH_MARKER),
				WalkState::EndedForced => {
					prop_assert_eq!(marker, "");
					prop_assert!(!imitation.text.is_empty());
				}
			}
		}
	}

	#[test]
	fn same_seed_replays_the_same_imitations(text in examples(), seed in any::<u32>(), (min, max) in bounds()) {
		let chain = ChainModel::build_from_text(&text);
		let mut first = Imitator::new(chain.clone(), seed);
		let mut second = Imitator::new(chain, seed);
		prop_assert_eq!(first.imitate_many(5, min, max).unwrap(), second.imitate_many(5, min, max).unwrap());
	}
}
