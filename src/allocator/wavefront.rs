/*!

Wavefront allocator: scans `num_inputs` diagonals of the request matrix in a single pass.
Diagonal `d` consists of the pairs `(i, (i+d) mod num_outputs)`; a pair on the diagonal is
granted if both its input and output are still free, which makes every diagonal a maximal
independent set by construction and the whole scan a single-iteration maximal matching.
The starting diagonal can be fixed (priority always favours the lowest-indexed input) or
advanced round-robin style each call so no input is permanently favoured.

*/

use crate::config::ConfigurationValue;
use crate::error::Error;
use rand::rngs::StdRng;
use itertools::iproduct;
use super::{Allocator,AllocRequest,Grant,AllocatorState};

#[derive(Debug)]
pub struct WavefrontAllocator
{
	state: AllocatorState,
	num_inputs: usize,
	num_outputs: usize,
	round_robin: bool,
	start_diagonal: usize,
}

impl WavefrontAllocator
{
	pub fn new(cv:&ConfigurationValue, num_inputs:usize, num_outputs:usize) -> Result<WavefrontAllocator,Error>
	{
		let mut round_robin = false;
		match_object!(cv, "Wavefront", value,
			"round_robin" => round_robin = value.as_bool()?,
		);
		Ok(WavefrontAllocator{ state:AllocatorState::default(), num_inputs, num_outputs, round_robin, start_diagonal:0 })
	}
}

impl Allocator for WavefrontAllocator
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

		for (offset,i) in iproduct!(0..self.num_inputs, 0..self.num_inputs)
		{
			let d = (self.start_diagonal + offset) % self.num_inputs;
			let o = (i+d) % self.num_outputs;
			if matched_input[i] || matched_output[o] { continue; }
			if self.state.masked_outputs.contains(&o) { continue; }
			if self.state.requests.contains(&(i,o))
			{
				matched_input[i] = true;
				matched_output[o] = true;
				grants.push(self.state.record_grant(i,o));
			}
		}
		if self.round_robin
		{
			self.start_diagonal = (self.start_diagonal+1) % self.num_inputs;
		}
		grants
	}

	fn output_assigned(&self, output:usize) -> Option<usize> { self.state.output_assignment.get(&output).copied() }
	fn input_assigned(&self, input:usize) -> Option<usize> { self.state.input_assignment.get(&input).copied() }
	fn mask_output(&mut self, output:usize) { self.state.masked_outputs.insert(output); }
	fn print_requests(&self) { println!("WavefrontAllocator requests: {:?}", self.state.requests); }
}
