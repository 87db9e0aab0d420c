/*!

Weighted round-robin: each input carries a configurable weight. The winner keeps
receiving grants (consuming its remaining share by one each time) until the share
reaches zero, at which point the round-robin pointer advances past it.

*/

use quantifiable_derive::Quantifiable;
use crate::quantify::Quantifiable;
use crate::config::ConfigurationValue;
use crate::error::Error;
use rand::rngs::StdRng;
use super::{Arbiter,ArbiterRequest,supersedes};

#[derive(Debug,Quantifiable)]
pub struct WeightedRoundRobinArbiter
{
	requests: Vec<Option<ArbiterRequest>>,
	weights: Vec<u32>,
	pointer: usize,
	remaining_share: u32,
}

impl WeightedRoundRobinArbiter
{
	pub fn new(cv:&ConfigurationValue, num_inputs:usize) -> Result<WeightedRoundRobinArbiter,Error>
	{
		let mut weights = vec![1u32;num_inputs];
		match_object!(cv, "WeightedRoundRobin", value,
			"weights" =>
			{
				let array = value.as_array()?;
				if array.len() != num_inputs
				{
					return Err(error!(IllFormedConfiguration, cv.clone()).with_message(
						"weights array length must match num_inputs".to_string()));
				}
				for (i,w) in array.iter().enumerate() { weights[i] = w.as_usize()? as u32; }
			}
		);
		let remaining_share = weights.first().copied().unwrap_or(1);
		Ok(WeightedRoundRobinArbiter{ requests: vec![None;num_inputs], weights, pointer: 0, remaining_share })
	}
}

impl Arbiter for WeightedRoundRobinArbiter
{
	fn add_request(&mut self, input:usize, id:u64, priority:i64)
	{
		let n = self.requests.len();
		let candidate = ArbiterRequest{ input, id, priority };
		match self.requests[input]
		{
			None => self.requests[input] = Some(candidate),
			Some(held) if supersedes(input,priority,held.input,held.priority,self.pointer,n) =>
				self.requests[input] = Some(candidate),
			_ => (),
		}
	}

	fn arbitrate(&mut self, _rng:&mut StdRng) -> Option<ArbiterRequest>
	{
		let n = self.requests.len();
		if n==0 { return None; }
		// The current pointer holder keeps its turn while it still has share and a request.
		if self.remaining_share>0
		{
			if let Some(req) = self.requests[self.pointer]
			{
				return Some(req);
			}
		}
		for offset in 1..=n
		{
			let i = (self.pointer+offset)%n;
			if let Some(req) = self.requests[i]
			{
				return Some(req);
			}
		}
		None
	}

	fn update_state(&mut self, winner:&ArbiterRequest)
	{
		if winner.input == self.pointer && self.remaining_share>0
		{
			self.remaining_share -= 1;
		}
		else
		{
			self.pointer = winner.input;
			self.remaining_share = self.weights[self.pointer].saturating_sub(1);
		}
	}

	fn clear(&mut self)
	{
		for r in self.requests.iter_mut() { *r = None; }
	}

	fn print_state(&self)
	{
		println!("WeightedRoundRobinArbiter{{ pointer: {}, remaining_share: {} }}", self.pointer, self.remaining_share);
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn heavier_weight_wins_consecutively()
	{
		let cv = ConfigurationValue::Object("WeightedRoundRobin".to_string(), vec![
			("weights".to_string(), ConfigurationValue::Array(vec![
				ConfigurationValue::Number(3.0), ConfigurationValue::Number(1.0),
			])),
		]);
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut arb = WeightedRoundRobinArbiter::new(&cv,2).unwrap();
		let mut wins = [0usize;2];
		for _ in 0..8
		{
			arb.add_request(0,1,1);
			arb.add_request(1,2,1);
			let w = arb.arbitrate(&mut rng).unwrap();
			wins[w.input]+=1;
			arb.update_state(&w);
			arb.clear();
		}
		assert!(wins[0] > wins[1]);
	}
}
