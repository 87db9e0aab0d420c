/*!

Error handling for configuration-time failures. Fatal invariant violations inside the
per-cycle pipeline (buffer overflow, non-head-at-idle, pid mismatch) are not represented
here; by the time such a state is reached the cycle-accurate semantics cannot safely
continue and the router panics with a diagnostic instead (see `Router::internal_step`).

*/

use std::fmt;

/// Where an `Error` was raised, captured through the `source_location!()` macro.
#[derive(Debug,Clone,Copy)]
pub struct SourceLocation
{
	pub file: &'static str,
	pub line: u32,
	pub column: u32,
}

impl fmt::Display for SourceLocation
{
	fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result
	{
		write!(f,"{}:{}:{}",self.file,self.line,self.column)
	}
}

#[macro_export]
macro_rules! source_location{
	() => {
		$crate::error::SourceLocation{ file: file!(), line: line!(), column: column!() }
	};
}

/// The classification of a configuration-time failure.
#[derive(Debug,Clone)]
pub enum ErrorKind
{
	/// A `ConfigurationValue` did not have the shape expected by the reader (wrong
	/// variant, missing key, or an `Object` under an unrecognized name).
	IllFormedConfiguration(crate::config::ConfigurationValue),
	/// `vc_allocator`/`sw_allocator` named a strategy with no registered constructor.
	UndefinedAllocator(String),
	/// `vc_alloc_arb_type`/`sw_alloc_arb_type` named a policy with no registered constructor.
	UndefinedArbiter(String),
	/// A priority policy name had no registered constructor.
	UndefinedPriorityPolicy(String),
	/// A pipeline stage delay was configured below its required minimum (`>= 1` for
	/// `vc_alloc_delay`/`sw_alloc_delay`, `>= 0` for `routing_delay`).
	InvalidStageDelay{ field: &'static str, value: i64 },
}

impl fmt::Display for ErrorKind
{
	fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result
	{
		match self
		{
			ErrorKind::IllFormedConfiguration(cv) => write!(f,"ill-formed configuration value: {:?}",cv),
			ErrorKind::UndefinedAllocator(name) => write!(f,"no allocator strategy named `{}`",name),
			ErrorKind::UndefinedArbiter(name) => write!(f,"no arbiter policy named `{}`",name),
			ErrorKind::UndefinedPriorityPolicy(name) => write!(f,"no priority policy named `{}`",name),
			ErrorKind::InvalidStageDelay{field,value} => write!(f,"field `{}` must be >= 1, got {}",field,value),
		}
	}
}

#[derive(Debug,Clone)]
pub struct Error
{
	pub source_location: SourceLocation,
	pub kind: ErrorKind,
	pub message: Option<String>,
}

impl Error
{
	pub fn new(source_location:SourceLocation, kind:ErrorKind) -> Error
	{
		Error{ source_location, kind, message:None }
	}
	pub fn with_message(mut self, message:String) -> Error
	{
		self.message=Some(message);
		self
	}
}

impl fmt::Display for Error
{
	fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result
	{
		write!(f,"{} at {}",self.kind,self.source_location)?;
		if let Some(ref m) = self.message
		{
			write!(f,": {}",m)?;
		}
		Ok(())
	}
}

impl std::error::Error for Error {}

/// Builds an `Error` tagged with the call site. `error!(IllFormedConfiguration, cv)`
/// or `error!(UndefinedAllocator, name.to_string())`.
#[macro_export]
macro_rules! error{
	($kind:ident, $($args:tt)*) => {{
		$crate::error::Error::new( $crate::source_location!(), $crate::error::ErrorKind::$kind($($args)*) )
	}};
	($kind:ident) => {{
		$crate::error::Error::new( $crate::source_location!(), $crate::error::ErrorKind::$kind )
	}};
}
