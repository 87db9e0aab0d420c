/*!

iSLIP: `iters` rounds of request/grant/accept. Every output grants its highest-priority
requester starting just after its own pointer; every input accepts its highest-priority
grant starting just after its own pointer; only inputs and outputs that were part of a
three-way match this round advance their pointers, so unders-subscribed ports never lose
their place in line. Converges to a maximal matching in O(log N) iterations under
uniform traffic.

*/

use crate::config::ConfigurationValue;
use crate::error::Error;
use rand::rngs::StdRng;
use super::{Allocator,AllocRequest,Grant,AllocatorState};

#[derive(Debug)]
pub struct IslipAllocator
{
	state: AllocatorState,
	num_inputs: usize,
	num_outputs: usize,
	iters: usize,
	input_pointer: Vec<usize>,
	output_pointer: Vec<usize>,
}

impl IslipAllocator
{
	pub fn new(cv:&ConfigurationValue, num_inputs:usize, num_outputs:usize) -> Result<IslipAllocator,Error>
	{
		let mut iters = 1usize;
		match_object!(cv, "Islip", value,
			"iters" => iters = value.as_usize()?,
		);
		Ok(IslipAllocator{
			state: AllocatorState::default(),
			num_inputs, num_outputs, iters,
			input_pointer: vec![0;num_inputs],
			output_pointer: vec![0;num_outputs],
		})
	}

	/// Picks, among `candidates`, the first one reached scanning forward from
	/// `(pointer+1) mod n`; candidates are (peer_index, priority).
	fn pick(candidates:&[(usize,i64)], pointer:usize, n:usize) -> Option<usize>
	{
		if candidates.is_empty() { return None; }
		let mut best : Option<(usize,i64,usize)> = None; // (peer, priority, distance)
		for &(peer,pri) in candidates
		{
			let distance = (peer + n - (pointer+1)%n) % n;
			let better = match best { None => true, Some((_,bp,bd)) => pri>bp || (pri==bp && distance<bd) };
			if better { best = Some((peer,pri,distance)); }
		}
		best.map(|(peer,_,_)|peer)
	}
}

impl Allocator for IslipAllocator
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

		for _ in 0..self.iters
		{
			// Request: every unmatched input with a pending request to an unmatched,
			// unmasked output requests it.
			let mut requests_per_output : Vec<Vec<(usize,i64)>> = vec![Vec::new();self.num_outputs];
			for &(i,o) in self.state.requests.iter()
			{
				if matched_input[i] || matched_output[o] || self.state.masked_outputs.contains(&o) { continue; }
				let (_,_,out_pri) = self.state.labels[&(i,o)];
				requests_per_output[o].push((i,out_pri));
			}

			// Grant: each requested output picks one input.
			let mut granted_by_output = vec![None;self.num_outputs];
			for o in 0..self.num_outputs
			{
				granted_by_output[o] = Self::pick(&requests_per_output[o], self.output_pointer[o], self.num_inputs);
			}

			// Accept: each input that received >=1 grant picks one output, using its own
			// pointer and the requests' in_pri as priority.
			let mut grants_per_input : Vec<Vec<(usize,i64)>> = vec![Vec::new();self.num_inputs];
			for (o,granted) in granted_by_output.iter().enumerate()
			{
				if let Some(i) = *granted
				{
					let (_,in_pri,_) = self.state.labels[&(i,o)];
					grants_per_input[i].push((o,in_pri));
				}
			}
			for i in 0..self.num_inputs
			{
				if let Some(o) = Self::pick(&grants_per_input[i], self.input_pointer[i], self.num_outputs)
				{
					matched_input[i] = true;
					matched_output[o] = true;
					grants.push(self.state.record_grant(i,o));
					// Pointers only advance for ports that were part of a 3-way match.
					self.input_pointer[i] = o;
					self.output_pointer[o] = i;
				}
			}
		}
		grants
	}

	fn output_assigned(&self, output:usize) -> Option<usize> { self.state.output_assignment.get(&output).copied() }
	fn input_assigned(&self, input:usize) -> Option<usize> { self.state.input_assignment.get(&input).copied() }
	fn mask_output(&mut self, output:usize) { self.state.masked_outputs.insert(output); }
	fn print_requests(&self) { println!("IslipAllocator requests: {:?}", self.state.requests); }
}
