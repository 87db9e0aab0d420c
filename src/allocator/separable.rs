/*!

Separable allocator: one stage of per-resource arbiters picks a single candidate per
client on one side, a second stage of per-resource arbiters on the other side resolves
the surviving pairs. Input-first and output-first are the same algorithm with the two
stages swapped.

*/

use rand::rngs::StdRng;
use crate::arbiter::round_robin::RoundRobinArbiter;
use crate::arbiter::Arbiter;
use super::{Allocator,AllocRequest,Grant,AllocatorState};

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Order { InputFirst, OutputFirst }

#[derive(Debug)]
pub struct SeparableAllocator
{
	state: AllocatorState,
	input_arbiters: Vec<RoundRobinArbiter>,
	output_arbiters: Vec<RoundRobinArbiter>,
	order: Order,
}

impl SeparableAllocator
{
	pub fn new(num_inputs:usize, num_outputs:usize, order:Order) -> SeparableAllocator
	{
		SeparableAllocator{
			state: AllocatorState::default(),
			input_arbiters: (0..num_inputs).map(|_|RoundRobinArbiter::new(num_outputs)).collect(),
			output_arbiters: (0..num_outputs).map(|_|RoundRobinArbiter::new(num_inputs)).collect(),
			order,
		}
	}

}

impl Allocator for SeparableAllocator
{
	fn clear(&mut self) { self.state.clear(); }
	fn add_request(&mut self, request:AllocRequest) { self.state.add_request(request); }
	fn remove_request(&mut self, input:usize, output:usize) { self.state.remove_request(input,output); }
	fn read_request(&self, input:usize, output:usize) -> bool { self.state.requests.contains(&(input,output)) }

	fn allocate(&mut self, rng:&mut StdRng) -> Vec<Grant>
	{
		let mut surviving = Vec::new();
		match self.order
		{
			Order::InputFirst =>
			{
				for arb in self.input_arbiters.iter_mut() { arb.clear(); }
				for &(i,o) in self.state.requests.iter()
				{
					if self.state.masked_outputs.contains(&o) { continue; }
					let (label,in_pri,_) = self.state.labels[&(i,o)];
					self.input_arbiters[i].add_request(o, label, in_pri);
				}
				for i in 0..self.input_arbiters.len()
				{
					if let Some(req) = self.input_arbiters[i].arbitrate(rng)
					{
						self.input_arbiters[i].update_state(&req);
						surviving.push((i,req.input)); // req.input here is the output index from the per-input arbiter's perspective
					}
				}
			},
			Order::OutputFirst =>
			{
				for arb in self.output_arbiters.iter_mut() { arb.clear(); }
				for &(i,o) in self.state.requests.iter()
				{
					if self.state.masked_outputs.contains(&o) { continue; }
					let (label,_,out_pri) = self.state.labels[&(i,o)];
					self.output_arbiters[o].add_request(i, label, out_pri);
				}
				for o in 0..self.output_arbiters.len()
				{
					if let Some(req) = self.output_arbiters[o].arbitrate(rng)
					{
						self.output_arbiters[o].update_state(&req);
						surviving.push((req.input,o));
					}
				}
			},
		}
		let mut grants = Vec::new();
		match self.order
		{
			Order::InputFirst =>
			{
				for arb in self.output_arbiters.iter_mut() { arb.clear(); }
				for &(i,o) in surviving.iter()
				{
					let (label,_,out_pri) = self.state.labels[&(i,o)];
					self.output_arbiters[o].add_request(i, label, out_pri);
				}
				for o in 0..self.output_arbiters.len()
				{
					if let Some(req) = self.output_arbiters[o].arbitrate(rng)
					{
						self.output_arbiters[o].update_state(&req);
						grants.push(self.state.record_grant(req.input, o));
					}
				}
			},
			Order::OutputFirst =>
			{
				for arb in self.input_arbiters.iter_mut() { arb.clear(); }
				for &(i,o) in surviving.iter()
				{
					let (label,in_pri,_) = self.state.labels[&(i,o)];
					self.input_arbiters[i].add_request(o, label, in_pri);
				}
				for i in 0..self.input_arbiters.len()
				{
					if let Some(req) = self.input_arbiters[i].arbitrate(rng)
					{
						self.input_arbiters[i].update_state(&req);
						grants.push(self.state.record_grant(i, req.input));
					}
				}
			},
		}
		grants
	}

	fn output_assigned(&self, output:usize) -> Option<usize> { self.state.output_assignment.get(&output).copied() }
	fn input_assigned(&self, input:usize) -> Option<usize> { self.state.input_assignment.get(&input).copied() }
	fn mask_output(&mut self, output:usize) { self.state.masked_outputs.insert(output); }
	fn print_requests(&self) { println!("SeparableAllocator({:?}) requests: {:?}", self.order, self.state.requests); }
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
		let mut alloc = SeparableAllocator::new(2,2,Order::InputFirst);
		alloc.add_request(AllocRequest{ input:0, output:1, label:7, in_pri:1, out_pri:1 });
		let grants = alloc.allocate(&mut rng);
        assert_valid_matching(&grants);
		assert_eq!(grants.len(),1);
		assert_eq!(grants[0].label,7);
	}

	#[test]
	fn contention_resolves_to_a_single_valid_match()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut alloc = SeparableAllocator::new(2,1,Order::InputFirst);
		alloc.add_request(AllocRequest{ input:0, output:0, label:1, in_pri:1, out_pri:1 });
		alloc.add_request(AllocRequest{ input:1, output:0, label:2, in_pri:1, out_pri:1 });
		let grants = alloc.allocate(&mut rng);
		assert_valid_matching(&grants);
		assert_eq!(grants.len(),1);
	}

	/// P8: after clear with no new requests, allocate returns the empty matching.
	#[test]
	fn clear_then_allocate_is_empty()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut alloc = SeparableAllocator::new(2,2,Order::OutputFirst);
		alloc.add_request(AllocRequest{ input:0, output:0, label:1, in_pri:1, out_pri:1 });
		alloc.clear();
		assert!(alloc.allocate(&mut rng).is_empty());
	}

	#[test]
	fn masked_output_never_granted()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut alloc = SeparableAllocator::new(1,1,Order::InputFirst);
		alloc.mask_output(0);
		alloc.add_request(AllocRequest{ input:0, output:0, label:1, in_pri:1, out_pri:1 });
		assert!(alloc.allocate(&mut rng).is_empty());
	}
}
