/*!

Parallel Iterative Matching: the same request/grant/accept structure as iSLIP, but both
the grant and accept steps pick uniformly at random among their candidates instead of
scanning from a pointer. Converges to a maximal matching in expectation within `iters`
rounds; unlike iSLIP it carries no persistent state across calls, so it never starves a
particular input under adversarial traffic patterns the way a fixed pointer can.

*/

use crate::config::ConfigurationValue;
use crate::error::Error;
use rand::Rng;
use rand::rngs::StdRng;
use super::{Allocator,AllocRequest,Grant,AllocatorState};

#[derive(Debug)]
pub struct PimAllocator
{
	state: AllocatorState,
	num_inputs: usize,
	num_outputs: usize,
	iters: usize,
}

impl PimAllocator
{
	pub fn new(cv:&ConfigurationValue, num_inputs:usize, num_outputs:usize) -> Result<PimAllocator,Error>
	{
		let mut iters = 1usize;
		match_object!(cv, "Pim", value,
			"iters" => iters = value.as_usize()?,
		);
		Ok(PimAllocator{ state:AllocatorState::default(), num_inputs, num_outputs, iters })
	}
}

fn pick_uniform(rng:&mut StdRng, candidates:&[usize]) -> Option<usize>
{
	if candidates.is_empty() { None } else { Some(candidates[rng.gen_range(0..candidates.len())]) }
}

impl Allocator for PimAllocator
{
	fn clear(&mut self) { self.state.clear(); }
	fn add_request(&mut self, request:AllocRequest) { self.state.add_request(request); }
	fn remove_request(&mut self, input:usize, output:usize) { self.state.remove_request(input,output); }
	fn read_request(&self, input:usize, output:usize) -> bool { self.state.requests.contains(&(input,output)) }

	fn allocate(&mut self, rng:&mut StdRng) -> Vec<Grant>
	{
		let mut matched_input = vec![false;self.num_inputs];
		let mut matched_output = vec![false;self.num_outputs];
		let mut grants = Vec::new();

		for _ in 0..self.iters
		{
			let mut requesters_of : Vec<Vec<usize>> = vec![Vec::new();self.num_outputs];
			for &(i,o) in self.state.requests.iter()
			{
				if matched_input[i] || matched_output[o] || self.state.masked_outputs.contains(&o) { continue; }
				requesters_of[o].push(i);
			}

			let mut granted_by_output = vec![None;self.num_outputs];
			for o in 0..self.num_outputs
			{
				granted_by_output[o] = pick_uniform(rng,&requesters_of[o]);
			}

			let mut grantees_of : Vec<Vec<usize>> = vec![Vec::new();self.num_inputs];
			for (o,granted) in granted_by_output.iter().enumerate()
			{
				if let Some(i) = *granted { grantees_of[i].push(o); }
			}

			for i in 0..self.num_inputs
			{
				if let Some(o) = pick_uniform(rng,&grantees_of[i])
				{
					matched_input[i] = true;
					matched_output[o] = true;
					grants.push(self.state.record_grant(i,o));
				}
			}
		}
		grants
	}

	fn output_assigned(&self, output:usize) -> Option<usize> { self.state.output_assignment.get(&output).copied() }
	fn input_assigned(&self, input:usize) -> Option<usize> { self.state.input_assignment.get(&input).copied() }
	fn mask_output(&mut self, output:usize) { self.state.masked_outputs.insert(output); }
	fn print_requests(&self) { println!("PimAllocator requests: {:?}", self.state.requests); }
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::allocator::test_support::assert_valid_matching;

	fn cv(iters:f64) -> ConfigurationValue
	{
		ConfigurationValue::Object("Pim".to_string(), vec![("iters".to_string(),ConfigurationValue::Number(iters))])
	}

	#[test]
	fn full_request_matrix_converges_towards_a_perfect_matching()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(7);
		let mut alloc = PimAllocator::new(&cv(4.0),4,4).unwrap();
		for i in 0..4 { for o in 0..4 { alloc.add_request(AllocRequest{ input:i, output:o, label:(i*4+o) as u64, in_pri:1, out_pri:1 }); } }
		let grants = alloc.allocate(&mut rng);
		assert_valid_matching(&grants);
		assert_eq!(grants.len(),4);
	}

	#[test]
	fn single_request_is_granted()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(7);
		let mut alloc = PimAllocator::new(&cv(1.0),2,2).unwrap();
		alloc.add_request(AllocRequest{ input:0, output:1, label:9, in_pri:1, out_pri:1 });
		let grants = alloc.allocate(&mut rng);
		assert_eq!(grants.len(),1);
		assert_eq!(grants[0].label,9);
	}
}
