use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct RecoveryConfig
{
	/// Include panic messages and backtraces in `500` responses.
	///
	/// This leaks implementation details to clients; turn it off anywhere but
	/// on your own machine.
	pub expose_diagnostics: bool,
}

impl Default for RecoveryConfig
{
	fn default() -> Self
	{
		Self { expose_diagnostics: true }
	}
}
