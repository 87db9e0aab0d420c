/*!

Matrix arbiter: a lower-triangular priority matrix `M[N][N]` where `priority(r,c) =
M[r][c]` if `r<=c` else `1 - M[c][r]`. An input wins iff it requests and no other
requesting input has priority over it. `update_state` zeroes the winner's row and sets
its column to 1, making it the least-preferred input in every future comparison — this
is what makes matrix arbitration strongly fair (P6).

*/

use quantifiable_derive::Quantifiable;
use crate::quantify::Quantifiable;
use crate::matrix::Matrix;
use rand::rngs::StdRng;
use super::{Arbiter,ArbiterRequest,supersedes};

#[derive(Debug,Quantifiable)]
pub struct MatrixArbiter
{
	requests: Vec<Option<ArbiterRequest>>,
	priority_matrix: Matrix<bool>,
	pointer: usize,
}

impl MatrixArbiter
{
	pub fn new(num_inputs:usize) -> MatrixArbiter
	{
		let mut m = Matrix::constant(false, num_inputs, num_inputs);
		// Seed with an arbitrary strict order (row<col has priority) so the very first
		// round is deterministic instead of an all-false tie.
		for r in 0..num_inputs
		{
			for c in (r+1)..num_inputs
			{
				*m.get_mut(r,c) = true;
			}
		}
		MatrixArbiter{ requests: vec![None;num_inputs], priority_matrix: m, pointer: 0 }
	}

	fn has_priority(&self, a:usize, b:usize) -> bool
	{
		if a==b { return false; }
		if a<=b { *self.priority_matrix.get(a,b) } else { !*self.priority_matrix.get(b,a) }
	}
}

impl Arbiter for MatrixArbiter
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
		'outer: for i in 0..n
		{
			if let Some(req) = self.requests[i]
			{
				for j in 0..n
				{
					if j!=i && self.requests[j].is_some() && self.has_priority(j,i)
					{
						continue 'outer;
					}
				}
				return Some(req);
			}
		}
		None
	}

	fn update_state(&mut self, winner:&ArbiterRequest)
	{
		let n = self.requests.len();
		let s = winner.input;
		self.pointer = s;
		// Row s -> 0 (s now loses to every c>s) and column s -> 1 (every r<s now beats s),
		// making the just-granted input the least-preferred one going forward.
		for c in 0..n
		{
			if c!=s
			{
				if s<=c { *self.priority_matrix.get_mut(s,c) = false; }
				else { *self.priority_matrix.get_mut(c,s) = true; }
			}
		}
	}

	fn clear(&mut self)
	{
		for r in self.requests.iter_mut() { *r = None; }
	}

	fn print_state(&self)
	{
		println!("MatrixArbiter{{ pointer: {} }}", self.pointer);
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	/// P6: two continuously-requesting inputs on a matrix arbiter must alternate grants.
	#[test]
	fn two_continuous_requesters_alternate()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut arb = MatrixArbiter::new(4);
		let mut wins = [0usize;4];
		for _ in 0..2000
		{
			arb.add_request(0,1,1);
			arb.add_request(1,2,1);
			let w = arb.arbitrate(&mut rng).unwrap();
			wins[w.input]+=1;
			arb.update_state(&w);
			arb.clear();
		}
		assert!((wins[0] as i64 - wins[1] as i64).abs() <= 1);
	}

	/// P6 over a longer horizon with a 4-input matrix, mirroring the spec's concrete
	/// "matrix arbiter strong fairness" scenario (scaled down from 10 000 cycles).
	#[test]
	fn strong_fairness_bounds_grant_count_difference()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(7);
		let mut arb = MatrixArbiter::new(4);
		let mut wins = [0usize;4];
		for _ in 0..10_000
		{
			arb.add_request(0,1,1);
			arb.add_request(1,2,1);
			let w = arb.arbitrate(&mut rng).unwrap();
			wins[w.input]+=1;
			arb.update_state(&w);
			arb.clear();
		}
		assert!((wins[0] as i64 - wins[1] as i64).abs() <= 1);
		assert_eq!(wins[0]+wins[1], 10_000);
	}

	#[test]
	fn clear_yields_empty_matching()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut arb = MatrixArbiter::new(3);
		arb.add_request(0,1,1);
		arb.clear();
		assert!(arb.arbitrate(&mut rng).is_none());
	}
}
