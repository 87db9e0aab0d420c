/*!

Round-robin arbiter: `arbitrate` scans inputs starting right after the pointer and
returns the first one that has a pending request; `update_state` moves the pointer to
the winner, so a just-granted input becomes the least-preferred for the next round.

*/

use quantifiable_derive::Quantifiable;
use crate::quantify::Quantifiable;
use rand::rngs::StdRng;
use super::{Arbiter,ArbiterRequest,supersedes};

#[derive(Debug,Quantifiable)]
pub struct RoundRobinArbiter
{
	requests: Vec<Option<ArbiterRequest>>,
	pointer: usize,
}

impl RoundRobinArbiter
{
	pub fn new(num_inputs:usize) -> RoundRobinArbiter
	{
		RoundRobinArbiter{ requests: vec![None;num_inputs], pointer: 0 }
	}
}

impl Arbiter for RoundRobinArbiter
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
		self.pointer = winner.input;
	}

	fn clear(&mut self)
	{
		for r in self.requests.iter_mut() { *r = None; }
	}

	fn print_state(&self)
	{
		println!("RoundRobinArbiter{{ pointer: {}, requests: {:?} }}", self.pointer, self.requests);
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn scans_forward_from_just_after_pointer()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut arb = RoundRobinArbiter::new(4);
		arb.add_request(0,10,1);
		arb.add_request(2,20,1);
		let winner = arb.arbitrate(&mut rng).unwrap();
		assert_eq!(winner.input, 0);
		arb.update_state(&winner);
		arb.clear();
		arb.add_request(0,10,1);
		arb.add_request(2,20,1);
		let winner2 = arb.arbitrate(&mut rng).unwrap();
		assert_eq!(winner2.input, 2);
	}

	/// Idempotence: re-adding a request for the same input with a higher priority
	/// replaces, not duplicates, the slot.
	#[test]
	fn add_request_is_idempotent_per_input()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut arb = RoundRobinArbiter::new(2);
		arb.add_request(0,1,1);
		arb.add_request(0,2,5);
		let winner = arb.arbitrate(&mut rng).unwrap();
		assert_eq!(winner.id, 2);
	}

	/// P8: after clear, arbitrate returns nothing.
	#[test]
	fn clear_yields_empty_matching()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut arb = RoundRobinArbiter::new(2);
		arb.add_request(0,1,1);
		arb.clear();
		assert!(arb.arbitrate(&mut rng).is_none());
	}
}
