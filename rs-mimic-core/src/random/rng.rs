use super::squirrel::noise_1d_unit;

/// Snapshot of a [`DeterministicRng`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RngState {
	pub seed: u32,
	pub position: u32,
}

/// An item with a sampling weight, for [`DeterministicRng::select_weighted_slice`].
#[derive(Clone, Debug, PartialEq)]
pub struct Weighted<T> {
	pub weight: u64,
	pub value: T,
}

/// Position-based pseudo-random generator.
///
/// Every draw is a pure function of `(position, seed)` and advances the
/// position by one, so a run can be replayed exactly from its seed and the
/// number of draws made so far.
///
/// An instance must have a single owner: two call sites advancing the same
/// position would make both sequences depend on their interleaving.
///
/// # Examples
///
/// ```rust
/// use rs_mimic_core::random::DeterministicRng;
///
/// let mut rng = DeterministicRng::new(42);
/// let first = rng.draw();
///
/// let mut replay = DeterministicRng::new(42);
/// assert_eq!(first, replay.draw());
/// ```
#[derive(Clone, Debug)]
pub struct DeterministicRng {
	seed: u32,
	initial_position: u32,
	position: u32,
}

impl DeterministicRng {
	/// Create a generator starting at position 0.
	#[must_use]
	pub fn new(seed: u32) -> Self {
		Self::with_position(seed, 0)
	}

	/// Create a generator starting at an arbitrary position.
	#[must_use]
	pub fn with_position(seed: u32, position: u32) -> Self {
		Self { seed, initial_position: position, position }
	}

	/// Current seed and position.
	#[must_use]
	pub fn state(&self) -> RngState {
		RngState { seed: self.seed, position: self.position }
	}

	/// Rewind to the initial position.
	///
	/// With `Some(position)`, that position becomes the new initial one first.
	pub fn reset_position(&mut self, position: Option<u32>) {
		if let Some(position) = position {
			self.initial_position = position;
		}
		self.position = self.initial_position;
	}

	/// Next value in `[0, 1)`.
	pub fn draw(&mut self) -> f64 {
		let value = noise_1d_unit(self.position, self.seed);
		self.position = self.position.wrapping_add(1);
		value
	}

	/// True with probability `chance` (one draw).
	pub fn is_chance(&mut self, chance: f64) -> bool {
		self.draw() < chance
	}

	/// Uniform pick from a slice (one draw, even when the slice is empty).
	pub fn select<'a, T>(&mut self, items: &'a [T]) -> Option<(usize, &'a T)> {
		let index = (self.draw() * items.len() as f64) as usize;
		items.get(index).map(|item| (index, item))
	}

	/// Weighted pick over `(key, weight)` pairs, skipping `excluded` keys.
	///
	/// Each eligible pair scores `draw() * weight`; the highest score wins and
	/// the first one wins ties. Exactly one draw is made per eligible pair, in
	/// iteration order. Returns `None` when nothing is eligible.
	pub fn select_weighted<K, I>(&mut self, items: I, excluded: &[K]) -> Option<K>
	where
		K: PartialEq,
		I: IntoIterator<Item = (K, u64)>,
	{
		let mut selected = None;
		let mut best = f64::NEG_INFINITY;
		for (key, weight) in items {
			if excluded.contains(&key) {
				continue;
			}
			let score = self.draw() * weight as f64;
			if score > best {
				best = score;
				selected = Some(key);
			}
		}
		selected
	}

	/// Weighted pick over a slice of [`Weighted`] items.
	pub fn select_weighted_slice<'a, T>(&mut self, items: &'a [Weighted<T>]) -> Option<&'a T> {
		let index = self.select_weighted(items.iter().enumerate().map(|(i, item)| (i, item.weight)), &[])?;
		Some(&items[index].value)
	}
}

/// A fresh seed from the operating system, for runs that should not be reproducible.
pub fn undeterministic_seed() -> u32 {
	rand::random()
}
