/*!

The configuration value model used to build routers, allocators and arbiters out of
textual option blocks such as

```ignore
IQRouter{
	num_vcs: 4,
	vc_buf_size: 8,
	vc_allocator: Islip{ iters: 3 },
	sw_allocator: Islip{ iters: 3 },
	speculative: 2,
}
```

`ConfigurationValue` only keeps the scalar/aggregate shape the core pipeline actually
consumes. The sweep-oriented variants of the upstream grammar (`Experiments`,
`NamedExperiments`, `Where`, `Expression`) belong to the multi-run experiment
orchestration layer, which is out of scope here; see DESIGN.md.

*/

use crate::error::{Error,ErrorKind};
use crate::time::Time;
use std::convert::TryInto;

#[derive(Debug,Clone,PartialEq)]
pub enum ConfigurationValue
{
	/// A double-quoted string, e.g. a named option such as `"round_robin"`.
	Literal(String),
	/// Any numeric option. Stored as `f64` and converted with a small tolerance check.
	Number(f64),
	/// A named object, `Name{ key1: value1, key2: value2 }`.
	Object(String,Vec<(String,ConfigurationValue)>),
	/// A list, `[value1, value2, value3]`.
	Array(Vec<ConfigurationValue>),
	True,
	False,
}

impl ConfigurationValue
{
	pub fn as_bool(&self) -> Result<bool,Error>
	{
		match self
		{
			ConfigurationValue::True => Ok(true),
			ConfigurationValue::False => Ok(false),
			_ => Err(error!(IllFormedConfiguration, self.clone())),
		}
	}
	pub fn as_str(&self) -> Result<&str,Error>
	{
		match self
		{
			ConfigurationValue::Literal(s) => Ok(s),
			_ => Err(error!(IllFormedConfiguration, self.clone())),
		}
	}
	pub fn as_f64(&self) -> Result<f64,Error>
	{
		match self
		{
			ConfigurationValue::Number(x) => Ok(*x),
			_ => Err(error!(IllFormedConfiguration, self.clone())),
		}
	}
	pub fn as_usize(&self) -> Result<usize,Error>
	{
		self.as_integer().map(|x| x as usize)
	}
	pub fn as_time(&self) -> Result<Time,Error>
	{
		self.as_integer().map(|x| x as Time)
	}
	fn as_integer(&self) -> Result<i64,Error>
	{
		match self
		{
			ConfigurationValue::Number(x) =>
			{
				let res = *x as i64;
				let y = res as f64;
				let tolerance = 1e-5;
				if (*x-y).abs() > tolerance
				{
					Err(error!(IllFormedConfiguration, self.clone()))
				}
				else
				{
					Ok(res)
				}
			},
			_ => Err(error!(IllFormedConfiguration, self.clone())),
		}
	}
	pub fn as_array(&self) -> Result<&Vec<ConfigurationValue>,Error>
	{
		match self
		{
			ConfigurationValue::Array(x) => Ok(x),
			_ => Err(error!(IllFormedConfiguration, self.clone())),
		}
	}
	/// The `Name` of an `Object(Name,_)`, for dispatch-by-string-match constructors.
	pub fn object_name(&self) -> Result<&str,Error>
	{
		match self
		{
			ConfigurationValue::Object(name,_) => Ok(name),
			_ => Err(error!(IllFormedConfiguration, self.clone())),
		}
	}
}

/// Iterates the key/value pairs of `$cv` (which must be `Object($name,_)` for one of the
/// names in `$names`), binding each value to `$valueid` and dispatching on the key
/// through `$arm`. Any key not matched by an arm is reported as an `Error`.
#[macro_export]
macro_rules! match_object{
	($cv:expr, $name:literal, $valueid:ident, $($arm:tt)* ) => {{
		match_object!($cv,[$name],$valueid,$($arm)*)
	}};
	($cv:expr, $names:expr, $valueid:ident, $($arm:tt)* ) => {{
		if let $crate::config::ConfigurationValue::Object(ref cv_name, ref cv_pairs) = $cv
		{
			if !$names.iter().any(|&x|x==cv_name)
			{
				return Err(error!(IllFormedConfiguration, $cv.clone()).with_message(
					format!("expected one of {:?}, got `{}`", $names, cv_name)));
			}
			for (name,$valueid) in cv_pairs.iter()
			{
				match AsRef::<str>::as_ref(name)
				{
					$( $arm )*
					_ => return Err(error!(IllFormedConfiguration,$cv.clone()).with_message(
						format!("nothing to do with field `{}` in {}",name,cv_name))),
				}
			}
		}
		else
		{
			return Err(error!(IllFormedConfiguration,$cv.clone()).with_message(
				format!("trying to build a {} from a non-Object",$names[0])));
		}
	}};
}

/// Like `match_object!` but panicking instead of returning an `Error`. Used by the few
/// constructors (mostly tests) that are not themselves fallible.
#[macro_export]
macro_rules! match_object_panic{
	($cv:expr, $name:literal, $valueid:ident ) => {{
		match_object_panic!($cv,[$name],$valueid,)
	}};
	($cv:expr, $name:literal, $valueid:ident, $($arm:tt)* ) => {{
		match_object_panic!($cv,[$name],$valueid,$($arm)*)
	}};
	($cv:expr, $names:expr, $valueid:ident, $($arm:tt)* ) => {{
		if let $crate::config::ConfigurationValue::Object(ref cv_name, ref cv_pairs) = $cv
		{
			if !$names.iter().any(|&x|x==cv_name)
			{
				panic!("expected one of {:?}, got `{}`",$names,cv_name);
			}
			for (name,$valueid) in cv_pairs.iter()
			{
				match AsRef::<str>::as_ref(name)
				{
					$( $arm )*
					_ => panic!("nothing to do with field `{}` in {}",name,cv_name),
				}
			}
		}
		else
		{
			panic!("trying to build a {} from a non-Object",$names[0]);
		}
	}};
}

impl TryInto<usize> for &ConfigurationValue
{
	type Error = Error;
	fn try_into(self) -> Result<usize,Error> { self.as_usize() }
}
