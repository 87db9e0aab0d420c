/*!

A router's mirror of the buffer state of the router (or ejection point) sitting at the
other end of each output FlitChannel. Drives the credit-based flow control that
`Router::internal_step` consults before making a VA or SA request: a request is never
made for a VC the downstream side has no room for.

*/

use quantifiable_derive::Quantifiable;
use crate::quantify::Quantifiable;
use crate::credit::Credit;

#[derive(Debug,Clone,Quantifiable)]
struct PerVc
{
	credits: i64,
	vc_size: usize,
	in_use_by: Option<(usize,usize)>,
	tail_sent: bool,
}

/// Per-output credit and availability tracking for every downstream VC.
#[derive(Debug,Clone,Quantifiable)]
pub struct BufferState
{
	vcs: Vec<PerVc>,
}

impl BufferState
{
	pub fn new(num_vcs:usize, vc_size:usize) -> BufferState
	{
		BufferState{
			vcs: (0..num_vcs).map(|_|PerVc{ credits: vc_size as i64, vc_size, in_use_by:None, tail_sent:false }).collect(),
		}
	}

	pub fn num_vcs(&self) -> usize { self.vcs.len() }

	/// A VC is available iff no upstream input-VC currently holds it (§3 BufferState
	/// invariant, and P2: VC exclusivity).
	pub fn is_available_for(&self, vc:usize) -> bool
	{
		self.vcs[vc].in_use_by.is_none()
	}

	pub fn has_credit(&self, vc:usize) -> bool
	{
		self.vcs[vc].credits > 0
	}

	pub fn credits(&self, vc:usize) -> i64
	{
		self.vcs[vc].credits
	}

	/// Called at a VA grant: reserves the downstream VC for `holder` (the upstream
	/// input-VC pair) until the tail departs.
	pub fn take_buffer(&mut self, vc:usize, holder:(usize,usize))
	{
		debug_assert!(self.is_available_for(vc), "VC exclusivity violated: vc {} already held", vc);
		self.vcs[vc].in_use_by = Some(holder);
		self.vcs[vc].tail_sent = false;
	}

	/// Called when a flit is actually sent to this output's VC; decrements its credit
	/// count and, on a tail flit, releases the reservation.
	pub fn sending_flit(&mut self, vc:usize, is_tail:bool)
	{
		self.vcs[vc].credits -= 1;
		debug_assert!(self.vcs[vc].credits >= 0, "credit count went negative for vc {}", vc);
		if is_tail
		{
			self.vcs[vc].in_use_by = None;
			self.vcs[vc].tail_sent = true;
		}
	}

	/// A Credit freeing `vc` arrived from downstream; gives the slot back.
	pub fn process_credit(&mut self, credit:&Credit)
	{
		for &vc in credit.vcs.iter()
		{
			self.vcs[vc].credits += 1;
			debug_assert!(self.vcs[vc].credits as usize <= self.vcs[vc].vc_size, "credit overcount for vc {}", vc);
		}
	}

	pub fn holder(&self, vc:usize) -> Option<(usize,usize)>
	{
		self.vcs[vc].in_use_by
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	/// P1: credits + in-flight + queued downstream must sum to vc_buf_size. Here we
	/// only model the credit half directly reachable from this struct: it must never
	/// exceed vc_size nor go negative.
	#[test]
	fn credit_count_stays_within_vc_size_bounds()
	{
		let mut bs = BufferState::new(1,4);
		assert_eq!(bs.credits(0), 4);
		bs.sending_flit(0,false);
		bs.sending_flit(0,false);
		assert_eq!(bs.credits(0), 2);
		bs.process_credit(&Credit::for_vc(0));
		assert_eq!(bs.credits(0), 3);
	}

	#[test]
	fn take_buffer_then_tail_releases_holder()
	{
		let mut bs = BufferState::new(1,4);
		bs.take_buffer(0, (2,1));
		assert!(!bs.is_available_for(0));
		assert_eq!(bs.holder(0), Some((2,1)));
		bs.sending_flit(0, true);
		assert!(bs.is_available_for(0));
	}

	#[test]
	#[should_panic]
	fn taking_an_already_held_vc_panics()
	{
		let mut bs = BufferState::new(1,4);
		bs.take_buffer(0, (0,0));
		bs.take_buffer(0, (1,0));
	}
}
