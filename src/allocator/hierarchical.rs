/*!

Hierarchical allocator: outputs are partitioned into groups of `group_size`. Each input
first picks, via a round-robin root arbiter, a single candidate group among those it has
pending requests for; the inputs that settled on the same group then run a full separable
allocator restricted to that group's outputs. Scales better than a flat separable
allocator on wide crossbars, since the root stage is O(num_inputs * num_groups) instead of
O(num_inputs * num_outputs).

*/

use crate::config::ConfigurationValue;
use crate::error::Error;
use rand::rngs::StdRng;
use crate::arbiter::round_robin::RoundRobinArbiter;
use crate::arbiter::Arbiter;
use super::{Allocator,AllocRequest,Grant,AllocatorState};
use super::separable::{SeparableAllocator,Order};

#[derive(Debug)]
pub struct HierarchicalAllocator
{
	state: AllocatorState,
	num_inputs: usize,
	num_outputs: usize,
	group_size: usize,
	root_arbiters: Vec<RoundRobinArbiter>,
	leaf_allocators: Vec<SeparableAllocator>,
}

impl HierarchicalAllocator
{
	pub fn new(cv:&ConfigurationValue, num_inputs:usize, num_outputs:usize) -> Result<HierarchicalAllocator,Error>
	{
		let mut group_size = num_outputs.max(1);
		match_object!(cv, "Hierarchical", value,
			"group_size" => group_size = value.as_usize()?,
		);
		if group_size==0
		{
			return Err(error!(IllFormedConfiguration, cv.clone()).with_message("group_size must be positive".to_string()));
		}
		let num_groups = (num_outputs + group_size - 1) / group_size;
		Ok(HierarchicalAllocator{
			state: AllocatorState::default(),
			num_inputs, num_outputs, group_size,
			root_arbiters: (0..num_inputs).map(|_|RoundRobinArbiter::new(num_groups)).collect(),
			leaf_allocators: (0..num_groups).map(|_|SeparableAllocator::new(num_inputs,group_size,Order::InputFirst)).collect(),
		})
	}

	fn group_of(&self, output:usize) -> usize { output / self.group_size }
	fn local_output(&self, output:usize) -> usize { output % self.group_size }
}

impl Allocator for HierarchicalAllocator
{
	fn clear(&mut self)
	{
		self.state.clear();
		for a in self.root_arbiters.iter_mut() { a.clear(); }
		for a in self.leaf_allocators.iter_mut() { a.clear(); }
	}
	fn add_request(&mut self, request:AllocRequest) { self.state.add_request(request); }
	fn remove_request(&mut self, input:usize, output:usize) { self.state.remove_request(input,output); }
	fn read_request(&self, input:usize, output:usize) -> bool { self.state.requests.contains(&(input,output)) }

	fn allocate(&mut self, rng:&mut StdRng) -> Vec<Grant>
	{
		for a in self.root_arbiters.iter_mut() { a.clear(); }
		for a in self.leaf_allocators.iter_mut() { a.clear(); }

		for &(i,o) in self.state.requests.iter()
		{
			if self.state.masked_outputs.contains(&o) { continue; }
			let group = self.group_of(o);
			let (label,in_pri,_) = self.state.labels[&(i,o)];
			self.root_arbiters[i].add_request(group, label, in_pri);
		}

		let mut chosen_group = vec![None;self.num_inputs];
		for i in 0..self.num_inputs
		{
			if let Some(req) = self.root_arbiters[i].arbitrate(rng)
			{
				self.root_arbiters[i].update_state(&req);
				chosen_group[i] = Some(req.input); // "input" field of the root arbiter's winner is the chosen group id
			}
		}

		for &(i,o) in self.state.requests.iter()
		{
			if self.state.masked_outputs.contains(&o) { continue; }
			let group = self.group_of(o);
			if chosen_group[i] != Some(group) { continue; }
			let (label,in_pri,out_pri) = self.state.labels[&(i,o)];
			self.leaf_allocators[group].add_request(AllocRequest{ input:i, output:self.local_output(o), label, in_pri, out_pri });
		}

		let mut grants = Vec::new();
		for (group,alloc) in self.leaf_allocators.iter_mut().enumerate()
		{
			for g in alloc.allocate(rng)
			{
				let output = group*self.group_size + g.output;
				self.state.input_assignment.insert(g.input,output);
				self.state.output_assignment.insert(output,g.input);
				grants.push(Grant{ input:g.input, output, label:g.label });
			}
		}
		grants
	}

	fn output_assigned(&self, output:usize) -> Option<usize> { self.state.output_assignment.get(&output).copied() }
	fn input_assigned(&self, input:usize) -> Option<usize> { self.state.input_assignment.get(&input).copied() }
	fn mask_output(&mut self, output:usize)
	{
		self.state.masked_outputs.insert(output);
		let group = self.group_of(output);
		self.leaf_allocators[group].mask_output(self.local_output(output));
	}
	fn print_requests(&self) { println!("HierarchicalAllocator requests: {:?}", self.state.requests); }
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::allocator::test_support::assert_valid_matching;

	fn cv(group_size:f64) -> ConfigurationValue
	{
		ConfigurationValue::Object("Hierarchical".to_string(), vec![("group_size".to_string(),ConfigurationValue::Number(group_size))])
	}

	#[test]
	fn single_request_is_granted()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut alloc = HierarchicalAllocator::new(&cv(2.0),4,4).unwrap();
		alloc.add_request(AllocRequest{ input:0, output:3, label:11, in_pri:1, out_pri:1 });
		let grants = alloc.allocate(&mut rng);
		assert_eq!(grants.len(),1);
		assert_eq!(grants[0].output,3);
		assert_eq!(grants[0].label,11);
	}

	#[test]
	fn requests_in_different_groups_both_granted()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut alloc = HierarchicalAllocator::new(&cv(2.0),2,4).unwrap();
		alloc.add_request(AllocRequest{ input:0, output:0, label:1, in_pri:1, out_pri:1 });
		alloc.add_request(AllocRequest{ input:1, output:2, label:2, in_pri:1, out_pri:1 });
		let grants = alloc.allocate(&mut rng);
		assert_valid_matching(&grants);
		assert_eq!(grants.len(),2);
	}

	#[test]
	fn masked_output_never_granted()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut alloc = HierarchicalAllocator::new(&cv(2.0),2,2).unwrap();
		alloc.mask_output(0);
		alloc.add_request(AllocRequest{ input:0, output:0, label:1, in_pri:1, out_pri:1 });
		assert!(alloc.allocate(&mut rng).is_empty());
	}
}
