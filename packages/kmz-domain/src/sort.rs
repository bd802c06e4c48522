use crate::{Error, Result};

/// A comparator over one record field, as produced by a `<field>_<operator>` token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortSpec {
	field: String,
	operator: String,
}
impl SortSpec {
	pub fn new(field: impl Into<String>, operator: impl Into<String>) -> Self {
		Self { field: field.into(), operator: operator.into() }
	}

	/// Splits at the last `_`, so field paths may themselves contain underscores.
	pub fn parse(token: &str) -> Result<Self> {
		let Some((field, operator)) = token.rsplit_once('_') else {
			return Err(Error::InvalidSortToken { token: token.to_string() });
		};

		if field.trim().is_empty() || operator.trim().is_empty() {
			return Err(Error::InvalidSortToken { token: token.to_string() });
		}

		Ok(Self::new(field, operator))
	}

	pub fn field(&self) -> &str {
		&self.field
	}

	pub fn operator(&self) -> &str {
		&self.operator
	}

	pub fn expression(&self) -> String {
		format!("x.{field} {operator} y.{field}", field = self.field, operator = self.operator)
	}

	pub fn token(&self) -> String {
		format!("{}_{}", self.field, self.operator)
	}
}
