/*!

Greedy maximum-size matcher: sorts all pending requests by combined priority, descending,
and accepts each one in turn whose input and output are both still free. Does not
guarantee the true maximum matching in general (that needs an augmenting-path search) but
the greedy bound of at least half the optimum is adequate for a per-cycle switch
allocator and is far cheaper than exact bipartite matching.

*/

use super::{Allocator,AllocRequest,Grant,AllocatorState};
use rand::rngs::StdRng;

#[derive(Debug,Default)]
pub struct MaxSizeAllocator
{
	state: AllocatorState,
	num_inputs: usize,
	num_outputs: usize,
}

impl MaxSizeAllocator
{
	pub fn new(num_inputs:usize, num_outputs:usize) -> MaxSizeAllocator
	{
		MaxSizeAllocator{ state:AllocatorState::default(), num_inputs, num_outputs }
	}
}

impl Allocator for MaxSizeAllocator
{
	fn clear(&mut self) { self.state.clear(); }
	fn add_request(&mut self, request:AllocRequest) { self.state.add_request(request); }
	fn remove_request(&mut self, input:usize, output:usize) { self.state.remove_request(input,output); }
	fn read_request(&self, input:usize, output:usize) -> bool { self.state.requests.contains(&(input,output)) }

	fn allocate(&mut self, _rng:&mut StdRng) -> Vec<Grant>
	{
		let mut matched_input = vec![false;self.num_inputs];
		let mut matched_output = vec![false;self.num_outputs];

		let mut candidates : Vec<(usize,usize,i64)> = self.state.requests.iter()
			.filter(|(i,o)|!self.state.masked_outputs.contains(o) && *i<self.num_inputs && *o<self.num_outputs)
			.map(|&(i,o)|
			{
				let (_,in_pri,out_pri) = self.state.labels[&(i,o)];
				(i,o,in_pri+out_pri)
			})
			.collect();
		// Stable sort keeps iteration-order ties deterministic given a fixed requests set.
		candidates.sort_by(|a,b|b.2.cmp(&a.2));

		let mut grants = Vec::new();
		for (i,o,_) in candidates
		{
			if matched_input[i] || matched_output[o] { continue; }
			matched_input[i] = true;
			matched_output[o] = true;
			grants.push(self.state.record_grant(i,o));
		}
		grants
	}

	fn output_assigned(&self, output:usize) -> Option<usize> { self.state.output_assignment.get(&output).copied() }
	fn input_assigned(&self, input:usize) -> Option<usize> { self.state.input_assignment.get(&input).copied() }
	fn mask_output(&mut self, output:usize) { self.state.masked_outputs.insert(output); }
	fn print_requests(&self) { println!("MaxSizeAllocator requests: {:?}", self.state.requests); }
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::allocator::test_support::assert_valid_matching;

	#[test]
	fn higher_priority_request_wins_contention()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut alloc = MaxSizeAllocator::new(2,1);
		alloc.add_request(AllocRequest{ input:0, output:0, label:1, in_pri:1, out_pri:1 });
		alloc.add_request(AllocRequest{ input:1, output:0, label:2, in_pri:5, out_pri:5 });
		let grants = alloc.allocate(&mut rng);
		assert_eq!(grants.len(),1);
		assert_eq!(grants[0].input,1);
	}

	#[test]
	fn disjoint_requests_all_granted()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut alloc = MaxSizeAllocator::new(3,3);
		for i in 0..3 { alloc.add_request(AllocRequest{ input:i, output:i, label:i as u64, in_pri:1, out_pri:1 }); }
		let grants = alloc.allocate(&mut rng);
		assert_valid_matching(&grants);
		assert_eq!(grants.len(),3);
	}
}
