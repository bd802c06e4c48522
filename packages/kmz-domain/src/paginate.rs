use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
	Forward,
	Backward,
}
impl Direction {
	pub fn step(self) -> i64 {
		match self {
			Self::Forward => 1,
			Self::Backward => -1,
		}
	}
}

/// Outcome of a paging request. `Unchanged` is a silent no-op: nothing was mutated and no query
/// should be issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageMove {
	Moved { start: u64 },
	Unchanged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginate {
	pub limit: u64,
	/// Absolute offset of the first requested result.
	pub start: u64,
	pub total_pages: u64,
	/// Direction of the last applied move (`1` forward, `-1` backward, `0` before any move). This
	/// is not an ordinal page number.
	pub current_page: i64,
}
impl Paginate {
	pub fn new(limit: u64) -> Self {
		Self { limit, start: 0, total_pages: 0, current_page: 0 }
	}

	/// The offset a move would land on, or `None` when the move is a no-op.
	///
	/// The offset is recomputed flat as `direction * limit` rather than accumulated from the
	/// current `start`, so consecutive forward moves all land on the second page. Backward moves
	/// floor at zero.
	pub fn plan(&self, direction: Direction, result_count: u64) -> Option<u64> {
		if direction == Direction::Backward && self.start == 0 {
			return None;
		}

		let start = match direction {
			Direction::Forward => self.limit,
			Direction::Backward => 0,
		};

		if start >= result_count {
			return None;
		}

		Some(start)
	}

	pub fn advance(&mut self, direction: Direction, result_count: u64) -> PageMove {
		let Some(start) = self.plan(direction, result_count) else {
			return PageMove::Unchanged;
		};

		self.start = start;
		self.current_page = direction.step();

		PageMove::Moved { start }
	}

	pub fn record_total(&mut self, result_count: u64) {
		self.total_pages = total_pages(result_count, self.limit);
	}
}

pub fn total_pages(result_count: u64, limit: u64) -> u64 {
	if limit == 0 {
		return 0;
	}

	result_count.div_ceil(limit)
}
