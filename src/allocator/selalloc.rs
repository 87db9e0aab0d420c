/*!

Selective allocator: runs both orderings of the separable allocator against the same
request set and keeps whichever matching is larger, breaking ties towards input-first.
Costs two arbitration passes per cycle but never does worse than either ordering alone,
which matters when traffic is skewed enough that one ordering's first stage collapses
into a single winner while the other spreads grants across more of the crossbar.

*/

use super::{Allocator,AllocRequest,Grant,AllocatorState};
use super::separable::{SeparableAllocator,Order};
use rand::rngs::StdRng;

#[derive(Debug)]
pub struct SelAllocAllocator
{
	state: AllocatorState,
	input_first: SeparableAllocator,
	output_first: SeparableAllocator,
}

impl SelAllocAllocator
{
	pub fn new(num_inputs:usize, num_outputs:usize) -> SelAllocAllocator
	{
		SelAllocAllocator{
			state: AllocatorState::default(),
			input_first: SeparableAllocator::new(num_inputs,num_outputs,Order::InputFirst),
			output_first: SeparableAllocator::new(num_inputs,num_outputs,Order::OutputFirst),
		}
	}
}

impl Allocator for SelAllocAllocator
{
	fn clear(&mut self)
	{
		self.state.clear();
		self.input_first.clear();
		self.output_first.clear();
	}
	fn add_request(&mut self, request:AllocRequest)
	{
		self.state.add_request(request);
		self.input_first.add_request(request);
		self.output_first.add_request(request);
	}
	fn remove_request(&mut self, input:usize, output:usize)
	{
		self.state.remove_request(input,output);
		self.input_first.remove_request(input,output);
		self.output_first.remove_request(input,output);
	}
	fn read_request(&self, input:usize, output:usize) -> bool { self.state.requests.contains(&(input,output)) }

	fn allocate(&mut self, rng:&mut StdRng) -> Vec<Grant>
	{
		let a = self.input_first.allocate(rng);
		let b = self.output_first.allocate(rng);
		let chosen = if b.len() > a.len() { b } else { a };
		for g in &chosen
		{
			self.state.input_assignment.insert(g.input,g.output);
			self.state.output_assignment.insert(g.output,g.input);
		}
		chosen
	}

	fn output_assigned(&self, output:usize) -> Option<usize> { self.state.output_assignment.get(&output).copied() }
	fn input_assigned(&self, input:usize) -> Option<usize> { self.state.input_assignment.get(&input).copied() }
	fn mask_output(&mut self, output:usize)
	{
		self.state.masked_outputs.insert(output);
		self.input_first.mask_output(output);
		self.output_first.mask_output(output);
	}
	fn print_requests(&self) { println!("SelAllocAllocator requests: {:?}", self.state.requests); }
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::allocator::test_support::assert_valid_matching;

	#[test]
	fn single_request_is_granted()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut alloc = SelAllocAllocator::new(2,2);
		alloc.add_request(AllocRequest{ input:0, output:1, label:4, in_pri:1, out_pri:1 });
		let grants = alloc.allocate(&mut rng);
		assert_valid_matching(&grants);
		assert_eq!(grants.len(),1);
		assert_eq!(grants[0].label,4);
	}

	#[test]
	fn clear_then_allocate_is_empty()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut alloc = SelAllocAllocator::new(2,2);
		alloc.add_request(AllocRequest{ input:0, output:0, label:1, in_pri:1, out_pri:1 });
		alloc.clear();
		assert!(alloc.allocate(&mut rng).is_empty());
	}
}
