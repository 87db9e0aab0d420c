/*!

Single-resource arbitration: picking one winner among requesting inputs for one output
resource (an output port in SA, an output VC in VA). Allocators (`crate::allocator`) are
built out of these.

*/

pub mod round_robin;
pub mod matrix;
pub mod weighted_rr;
pub mod probabilistic;

use crate::config::ConfigurationValue;
use crate::error::Error;
use rand::rngs::StdRng;

/// One arbitration request slot.
#[derive(Debug,Clone,Copy)]
pub struct ArbiterRequest
{
	pub input: usize,
	pub id: u64,
	pub priority: i64,
}

/// Tie-break rule shared by every policy: the new request beats the held one if it has
/// strictly higher priority, or on equal priority if its input is closer to `ptr` in
/// round-robin order starting just after `ptr`.
pub fn supersedes(new_input:usize, new_pri:i64, held_input:usize, held_pri:i64, ptr:usize, n:usize) -> bool
{
	if new_pri != held_pri
	{
		return new_pri > held_pri;
	}
	let dist = |i:usize| (i + n - (ptr+1)%n) % n;
	dist(new_input) < dist(held_input)
}

pub trait Arbiter : std::fmt::Debug
{
	/// Registers (or replaces, if `input` already has a pending request this round) a
	/// request. Arbiters MUST be idempotent here: the last, highest-priority request for
	/// a given input in one round wins.
	fn add_request(&mut self, input:usize, id:u64, priority:i64);
	/// Picks a winner among the requests added since the last `clear`/`update_state`.
	fn arbitrate(&mut self, rng:&mut StdRng) -> Option<ArbiterRequest>;
	/// Commits the result of the last `arbitrate` call into the arbiter's fairness state
	/// (round-robin pointer, matrix rows/columns, weighted-RR share, ...).
	fn update_state(&mut self, winner:&ArbiterRequest);
	/// Drops all pending requests without touching fairness state.
	fn clear(&mut self);
	fn print_state(&self);
}

#[derive(Debug)]
pub struct ArbiterBuilderArgument<'a>
{
	pub cv: &'a ConfigurationValue,
	pub num_inputs: usize,
}

/// Builds an arbiter from a `ConfigurationValue::Object` named `RoundRobin`, `Matrix`,
/// `WeightedRoundRobin` or `Probabilistic`.
pub fn new_arbiter(arg:ArbiterBuilderArgument) -> Result<Box<dyn Arbiter>,Error>
{
	match arg.cv.object_name()?
	{
		"RoundRobin" => Ok(Box::new(round_robin::RoundRobinArbiter::new(arg.num_inputs))),
		"Matrix" => Ok(Box::new(matrix::MatrixArbiter::new(arg.num_inputs))),
		"WeightedRoundRobin" => Ok(Box::new(weighted_rr::WeightedRoundRobinArbiter::new(arg.cv, arg.num_inputs)?)),
		"Probabilistic" => Ok(Box::new(probabilistic::ProbabilisticArbiter::new(arg.num_inputs))),
		name => Err(error!(UndefinedArbiter, name.to_string())),
	}
}
