/*!

Probabilistic arbiter: each request's weight is its priority; the winner is drawn
uniformly from `[0, sum of priorities)`. Requires the allocator call site to supply
priorities that make sense as weights (i.e. non-negative); a request with priority <= 0
simply never wins.

*/

use quantifiable_derive::Quantifiable;
use crate::quantify::Quantifiable;
use rand::Rng;
use rand::rngs::StdRng;
use super::{Arbiter,ArbiterRequest,supersedes};

#[derive(Debug,Quantifiable)]
pub struct ProbabilisticArbiter
{
	requests: Vec<Option<ArbiterRequest>>,
	pointer: usize,
}

impl ProbabilisticArbiter
{
	pub fn new(num_inputs:usize) -> ProbabilisticArbiter
	{
		ProbabilisticArbiter{ requests: vec![None;num_inputs], pointer: 0 }
	}
}

impl Arbiter for ProbabilisticArbiter
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

	fn arbitrate(&mut self, rng:&mut StdRng) -> Option<ArbiterRequest>
	{
		let total : i64 = self.requests.iter().flatten().map(|r|r.priority.max(1)).sum();
		if total<=0 { return None; }
		let mut draw = rng.gen_range(0..total);
		for req in self.requests.iter().flatten()
		{
			let w = req.priority.max(1);
			if draw < w { return Some(*req); }
			draw -= w;
		}
		None
	}

	fn update_state(&mut self, winner:&ArbiterRequest)
	{
		self.pointer = winner.input;
	}

	fn clear(&mut self)
	{
		for r in self.requests.iter_mut() { *r = None; }
	}

	fn print_state(&self)
	{
		println!("ProbabilisticArbiter{{ pointer: {} }}", self.pointer);
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn always_picks_among_requesters()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(3);
		let mut arb = ProbabilisticArbiter::new(3);
		arb.add_request(0,1,5);
		arb.add_request(2,2,1);
		for _ in 0..20
		{
			let w = arb.arbitrate(&mut rng).unwrap();
			assert!(w.input==0 || w.input==2);
		}
	}

	#[test]
	fn empty_requests_yield_none()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(3);
		let mut arb = ProbabilisticArbiter::new(3);
		assert!(arb.arbitrate(&mut rng).is_none());
	}
}
