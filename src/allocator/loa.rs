/*!

Lonely Output Allocator: outputs with exactly one pending requester ("lonely" outputs)
are granted immediately, since no arbitration can improve on the only available choice.
Remaining outputs fall back to a priority scan among their surviving requesters. Repeating
this in rounds until nothing new is lonely favours outputs that few inputs compete for,
so traffic skewed towards a handful of hot destinations doesn't starve the rest.

*/

use super::{Allocator,AllocRequest,Grant,AllocatorState};
use rand::rngs::StdRng;

#[derive(Debug,Default)]
pub struct LoaAllocator
{
	state: AllocatorState,
	num_inputs: usize,
	num_outputs: usize,
}

impl LoaAllocator
{
	pub fn new(num_inputs:usize, num_outputs:usize) -> LoaAllocator
	{
		LoaAllocator{ state:AllocatorState::default(), num_inputs, num_outputs }
	}
}

impl Allocator for LoaAllocator
{
	fn clear(&mut self) { self.state.clear(); }
	fn add_request(&mut self, request:AllocRequest) { self.state.add_request(request); }
	fn remove_request(&mut self, input:usize, output:usize) { self.state.remove_request(input,output); }
	fn read_request(&self, input:usize, output:usize) -> bool { self.state.requests.contains(&(input,output)) }

	fn allocate(&mut self, _rng:&mut StdRng) -> Vec<Grant>
	{
		let mut matched_input = vec![false;self.num_inputs];
		let mut matched_output = vec![false;self.num_outputs];
		let mut grants = Vec::new();

		loop
		{
			let mut requesters_of : Vec<Vec<usize>> = vec![Vec::new();self.num_outputs];
			for &(i,o) in self.state.requests.iter()
			{
				if matched_input[i] || matched_output[o] || self.state.masked_outputs.contains(&o) { continue; }
				requesters_of[o].push(i);
			}
			// Grant every output with exactly one surviving requester; first-fit on the
			// input side in case two lonely outputs share their one requester.
			let mut progressed = false;
			for o in 0..self.num_outputs
			{
				if requesters_of[o].len()==1
				{
					let i = requesters_of[o][0];
					if matched_input[i] { continue; }
					matched_input[i] = true;
					matched_output[o] = true;
					grants.push(self.state.record_grant(i,o));
					progressed = true;
				}
			}
			if !progressed { break; }
		}

		// Whatever remains contested falls back to a deterministic priority scan.
		let mut requesters_of : Vec<Vec<(usize,i64)>> = vec![Vec::new();self.num_outputs];
		for &(i,o) in self.state.requests.iter()
		{
			if matched_input[i] || matched_output[o] || self.state.masked_outputs.contains(&o) { continue; }
			let (_,_,out_pri) = self.state.labels[&(i,o)];
			requesters_of[o].push((i,out_pri));
		}
		for o in 0..self.num_outputs
		{
			if matched_output[o] { continue; }
			if let Some(&(i,_)) = requesters_of[o].iter().filter(|(i,_)|!matched_input[*i]).max_by_key(|(_,pri)|*pri)
			{
				matched_input[i] = true;
				matched_output[o] = true;
				grants.push(self.state.record_grant(i,o));
			}
		}
		grants
	}

	fn output_assigned(&self, output:usize) -> Option<usize> { self.state.output_assignment.get(&output).copied() }
	fn input_assigned(&self, input:usize) -> Option<usize> { self.state.input_assignment.get(&input).copied() }
	fn mask_output(&mut self, output:usize) { self.state.masked_outputs.insert(output); }
	fn print_requests(&self) { println!("LoaAllocator requests: {:?}", self.state.requests); }
}
