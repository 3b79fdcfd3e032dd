//! SquirrelNoise5 position hash.
//!
//! Maps `(position, seed)` to 32 well-mixed bits with no internal state, so
//! any draw can be recomputed from its position alone.

const BIT_NOISE1: u32 = 0xD2A8_0A3F;
const BIT_NOISE2: u32 = 0xA884_F197;
const BIT_NOISE3: u32 = 0x6C73_6F4B;
const BIT_NOISE4: u32 = 0xB79F_3ABB;
const BIT_NOISE5: u32 = 0x1B56_C4F5;

/// Raw 32-bit noise at `position` for `seed`.
pub fn noise_1d(position: u32, seed: u32) -> u32 {
	let mut mangled = position;
	mangled = mangled.wrapping_mul(BIT_NOISE1);
	mangled = mangled.wrapping_add(seed);
	mangled ^= mangled >> 9;
	mangled = mangled.wrapping_add(BIT_NOISE2);
	mangled ^= mangled >> 11;
	mangled = mangled.wrapping_mul(BIT_NOISE3);
	mangled ^= mangled >> 13;
	mangled = mangled.wrapping_add(BIT_NOISE4);
	mangled ^= mangled >> 15;
	mangled = mangled.wrapping_mul(BIT_NOISE5);
	mangled ^= mangled >> 17;
	mangled
}

/// Noise at `position` scaled to `[0, 1)`.
pub fn noise_1d_unit(position: u32, seed: u32) -> f64 {
	f64::from(noise_1d(position, seed)) / 4_294_967_296.0
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn known_answers() {
		let cases: [(u32, u32, u32); 8] = [
			(0, 0, 0x1679_1E00),
			(1, 0, 0xC895_CB1D),
			(2, 0, 0xB360_1CD9),
			(0, 1, 0x23F6_C851),
			(1, 42, 0xD6C5_6929),
			(100, 7, 0x5BF3_FBDD),
			(12345, 0xDEAD_BEEF, 0xF5D1_63BC),
			(u32::MAX, u32::MAX, 0xBEA4_6556),
		];
		for (position, seed, expected) in cases {
			assert_eq!(noise_1d(position, seed), expected, "position {position}, seed {seed}");
		}
	}

	#[test]
	fn unit_noise_stays_below_one() {
		for position in 0..10_000 {
			let value = noise_1d_unit(position, 12345);
			assert!((0.0..1.0).contains(&value));
		}
		assert!(f64::from(u32::MAX) / 4_294_967_296.0 < 1.0);
	}

	#[test]
	fn seed_changes_output() {
		let differing = (0..100).filter(|p| noise_1d(*p, 1) != noise_1d(*p, 2)).count();
		assert!(differing > 90);
	}
}
