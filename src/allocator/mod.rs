/*!

Bipartite matching between the expanded inputs and expanded outputs of a router
crossbar. Built on top of `crate::arbiter`: separable and hierarchical strategies are
literally single-resource arbiters composed together; wavefront, iSLIP and PIM implement
their own matching loops directly.

see [`new_allocator`] for the configuration syntax of the predefined strategies.

*/

pub mod separable;
pub mod wavefront;
pub mod islip;
pub mod pim;
pub mod loa;
pub mod maxsize;
pub mod selalloc;
pub mod hierarchical;

use std::collections::HashSet;
use crate::config::ConfigurationValue;
use crate::error::Error;
use rand::rngs::StdRng;

/// A request keyed by (expanded_input, expanded_output), carrying a caller-supplied
/// `label` identifying the requesting VC plus separate input-side/output-side
/// priorities, since separable allocators arbitrate each side with its own priority.
#[derive(Debug,Clone,Copy)]
pub struct AllocRequest
{
	pub input: usize,
	pub output: usize,
	pub label: u64,
	pub in_pri: i64,
	pub out_pri: i64,
}

/// One matched (input, output) pair, carrying the label of the winning request so the
/// caller can map it back to a VC without a second lookup.
#[derive(Debug,Clone,Copy)]
pub struct Grant
{
	pub input: usize,
	pub output: usize,
	pub label: u64,
}

/**
Manages the requests from a set of expanded inputs to a set of expanded outputs.
Requests are added via `add_request`; a call to `allocate` returns a valid, possibly
partial, matching where each input and each non-masked output appears at most once
(P8: a prior `clear` with no subsequent requests makes `allocate` return the empty
matching).
*/
pub trait Allocator : std::fmt::Debug
{
	fn clear(&mut self);
	fn add_request(&mut self, request:AllocRequest);
	fn remove_request(&mut self, input:usize, output:usize);
	fn read_request(&self, input:usize, output:usize) -> bool;
	fn allocate(&mut self, rng:&mut StdRng) -> Vec<Grant>;
	fn output_assigned(&self, output:usize) -> Option<usize>;
	fn input_assigned(&self, input:usize) -> Option<usize>;
	/// Excludes `output` from ever being granted until the next `clear`. Used to host a
	/// single allocator instance across several independent sub-crossbars.
	fn mask_output(&mut self, output:usize);
	fn print_requests(&self);
}

/// Shared bookkeeping every allocator implementation is built on: the pending-request
/// set and the result of the last `allocate` call, both reset by `clear`.
#[derive(Debug,Default)]
pub(crate) struct AllocatorState
{
	pub(crate) requests: HashSet<(usize,usize)>,
	pub(crate) labels: std::collections::HashMap<(usize,usize),(u64,i64,i64)>,
	pub(crate) masked_outputs: HashSet<usize>,
	pub(crate) input_assignment: std::collections::HashMap<usize,usize>,
	pub(crate) output_assignment: std::collections::HashMap<usize,usize>,
}

impl AllocatorState
{
	pub(crate) fn clear(&mut self)
	{
		self.requests.clear();
		self.labels.clear();
		self.masked_outputs.clear();
		self.input_assignment.clear();
		self.output_assignment.clear();
	}
	/// A second request for the same `(input,output)` key (two VCs of one input routed to
	/// the same physical output) does not simply overwrite the first: the one with the
	/// higher `in_pri` is kept, so an unrelated insertion order never silently starves the
	/// higher-priority VC under age/hop-count priority policies.
	pub(crate) fn add_request(&mut self, request:AllocRequest)
	{
		let key = (request.input,request.output);
		self.requests.insert(key);
		let replace = match self.labels.get(&key)
		{
			Some(&(_,existing_in_pri,_)) => request.in_pri > existing_in_pri,
			None => true,
		};
		if replace
		{
			self.labels.insert(key, (request.label,request.in_pri,request.out_pri));
		}
	}
	pub(crate) fn remove_request(&mut self, input:usize, output:usize)
	{
		self.requests.remove(&(input,output));
		self.labels.remove(&(input,output));
	}
	pub(crate) fn record_grant(&mut self, input:usize, output:usize) -> Grant
	{
		self.input_assignment.insert(input,output);
		self.output_assignment.insert(output,input);
		let label = self.labels.get(&(input,output)).map(|l|l.0).unwrap_or(0);
		Grant{ input, output, label }
	}
}

#[derive(Debug)]
pub struct AllocatorBuilderArgument<'a>
{
	pub cv: &'a ConfigurationValue,
	pub num_inputs: usize,
	pub num_outputs: usize,
}

/**
Builds an allocator from a `ConfigurationValue::Object`. Recognized strategies:
`SeparableInputFirst`, `SeparableOutputFirst`, `Wavefront{ round_robin: bool }`,
`Islip{ iters: N }`, `Pim{ iters: N }`, `Loa`, `MaxSize`, `SelAlloc`,
`Hierarchical{ group_size: N }`.
*/
pub fn new_allocator(arg:AllocatorBuilderArgument) -> Result<Box<dyn Allocator>,Error>
{
	match arg.cv.object_name()?
	{
		"SeparableInputFirst" => Ok(Box::new(separable::SeparableAllocator::new(arg.num_inputs,arg.num_outputs,separable::Order::InputFirst))),
		"SeparableOutputFirst" => Ok(Box::new(separable::SeparableAllocator::new(arg.num_inputs,arg.num_outputs,separable::Order::OutputFirst))),
		"Wavefront" => Ok(Box::new(wavefront::WavefrontAllocator::new(arg.cv,arg.num_inputs,arg.num_outputs)?)),
		"Islip" => Ok(Box::new(islip::IslipAllocator::new(arg.cv,arg.num_inputs,arg.num_outputs)?)),
		"Pim" => Ok(Box::new(pim::PimAllocator::new(arg.cv,arg.num_inputs,arg.num_outputs)?)),
		"Loa" => Ok(Box::new(loa::LoaAllocator::new(arg.num_inputs,arg.num_outputs))),
		"MaxSize" => Ok(Box::new(maxsize::MaxSizeAllocator::new(arg.num_inputs,arg.num_outputs))),
		"SelAlloc" => Ok(Box::new(selalloc::SelAllocAllocator::new(arg.num_inputs,arg.num_outputs))),
		"Hierarchical" => Ok(Box::new(hierarchical::HierarchicalAllocator::new(arg.cv,arg.num_inputs,arg.num_outputs)?)),
		name => Err(error!(UndefinedAllocator, name.to_string())),
	}
}

#[cfg(test)]
pub(crate) mod test_support
{
	use super::*;

	/// Checks the matching validity every `Allocator::allocate` result must satisfy:
	/// each input and each output appears at most once.
	pub fn assert_valid_matching(grants:&[Grant])
	{
		let mut inputs = HashSet::new();
		let mut outputs = HashSet::new();
		for g in grants
		{
			assert!(inputs.insert(g.input), "input {} granted twice", g.input);
			assert!(outputs.insert(g.output), "output {} granted twice", g.output);
		}
	}
}
