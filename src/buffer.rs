/*!

Per-input storage: one `Buffer` per router input port, owning a `VC` per configured
virtual channel plus an optional shared overflow pool. Each `VC` carries its own
four/six-state machine (§4.2) and caches the routing decision made on its head flit.

*/

use std::collections::VecDeque;
use quantifiable_derive::Quantifiable;
use crate::quantify::Quantifiable;
use crate::flit::Flit;
use crate::time::Time;

/// A sparse set of legal (port, vc-range, priority) triples returned by the routing
/// function for a head flit. The core never constructs instances of the `vc_start..vc_end`
/// pairs beyond what the routing function supplies; it is a pure recipient.
#[derive(Debug,Clone,Default,Quantifiable)]
pub struct OutputSet
{
	entries: Vec<OutputSetEntry>,
}

#[derive(Debug,Clone,Copy,Quantifiable)]
pub struct OutputSetEntry
{
	pub out_port: usize,
	pub vc_start: usize,
	pub vc_end: usize,
	pub priority: i64,
}

impl OutputSet
{
	pub fn new() -> OutputSet { OutputSet{ entries: Vec::new() } }

	/// Adds a candidate; `vc_start` must be `<= vc_end`, as later entries may refine
	/// priorities for an already-added port.
	pub fn add(&mut self, out_port:usize, vc_start:usize, vc_end:usize, priority:i64)
	{
		debug_assert!(vc_start<=vc_end, "OutputSet entry with vc_start > vc_end");
		self.entries.push(OutputSetEntry{ out_port, vc_start, vc_end, priority });
	}

	pub fn iter(&self) -> impl Iterator<Item=&OutputSetEntry>
	{
		self.entries.iter()
	}

	pub fn is_empty(&self) -> bool { self.entries.is_empty() }

	/// Every individual (out_port, out_vc) pair covered by the entries, expanded out.
	pub fn expand(&self) -> impl Iterator<Item=(usize,usize,i64)> + '_
	{
		self.entries.iter().flat_map(|e| (e.vc_start..=e.vc_end).map(move |vc|(e.out_port,vc,e.priority)))
	}
}

/// The state a virtual channel is in within the RC -> VA -> SA -> ST pipeline.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default)]
pub enum VcState
{
	#[default]
	Idle,
	Routing,
	VcAlloc,
	/// Speculative counterpart of `VcAlloc`: awaiting VA, but already eligible to bid in SA.
	VcSpec,
	/// A speculative VA grant landed; promoted to `Active` on the next SA iteration.
	VcSpecGrant,
	Active,
}

/// How the per-VC priority handed to arbiters is derived from the head flit.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum PriorityPolicy
{
	None,
	LocalAge,
	QueueLength,
	HopCount,
	/// Use whatever the head flit's own `pri` field carries.
	Other,
}

/// Per-input virtual channel: buffer, state machine, cached route and output assignment.
#[derive(Debug,Clone,Quantifiable)]
pub struct Vc
{
	pub buffer: VecDeque<Flit>,
	pub state: VcState,
	/// Number of cycles spent in the current state; reset on every transition.
	pub state_time: Time,
	pub route_set: OutputSet,
	/// `None` until a VA grant assigns an (out_port, out_vc) pair.
	pub output: Option<(usize,usize)>,
	pub priority: i64,
	/// The `pid` of the packet currently occupying this VC in `Active`/`VcSpec*` states,
	/// used to catch a mismatched-pid fatal diagnostic.
	pub expected_pid: Option<u64>,
	pub watched: bool,
	vc_size: usize,
}

impl Vc
{
	pub fn new(vc_size:usize) -> Vc
	{
		Vc{
			buffer: VecDeque::new(),
			state: VcState::Idle,
			state_time: 0,
			route_set: OutputSet::new(),
			output: None,
			priority: 0,
			expected_pid: None,
			watched: false,
			vc_size,
		}
	}

	pub fn vc_size(&self) -> usize { self.vc_size }
	pub fn occupancy(&self) -> usize { self.buffer.len() }
	pub fn empty(&self) -> bool { self.buffer.is_empty() }
	/// Whether the VC's own slots (ignoring any shared overflow pool) are exhausted.
	pub fn own_slots_full(&self) -> bool { self.buffer.len() >= self.vc_size }
	pub fn front(&self) -> Option<&Flit> { self.buffer.front() }

	pub fn set_state(&mut self, state:VcState)
	{
		self.state = state;
		self.state_time = 0;
	}

	/// Like `set_state`, but keeps `state_time` running. Used for the `VcSpec` ->
	/// `VcSpecGrant` transition: that VC has been SA-eligible since it entered `VcSpec`,
	/// and winning VA this cycle must not reset the clock SA gates on.
	pub fn set_state_keep_time(&mut self, state:VcState)
	{
		self.state = state;
	}

	pub fn advance_time(&mut self)
	{
		self.state_time += 1;
	}

	/// Invariant (i) of §3: a non-head flit must never arrive at an Idle VC. Panics, per
	/// §7, since this indicates a corrupted credit protocol upstream.
	pub fn push(&mut self, flit:Flit)
	{
		if self.state == VcState::Idle && !flit.head
		{
			panic!("fatal: non-head flit {} arrived at an idle VC", flit.id);
		}
		if let Some(pid) = self.expected_pid
		{
			if !self.buffer.is_empty() && flit.pid != pid
			{
				panic!("fatal: pid mismatch in VC, expected {} got {} (flit {})", pid, flit.pid, flit.id);
			}
		}
		if flit.head
		{
			self.expected_pid = Some(flit.pid);
		}
		self.buffer.push_back(flit);
	}

	/// Pops the head flit; clears the cached route and output assignment once the tail
	/// departs, so the next head flit starts a fresh RC/VA cycle.
	pub fn pop(&mut self) -> Option<Flit>
	{
		let flit = self.buffer.pop_front();
		if let Some(ref f) = flit
		{
			if f.tail
			{
				self.route_set = OutputSet::new();
				self.output = None;
				self.expected_pid = None;
			}
		}
		flit
	}

	/// Recomputes `priority` from the head flit according to the configured policy.
	/// Called whenever the head flit changes (i.e. after a `pop` that was not a tail, or
	/// when a new head arrives at an Idle VC).
	pub fn refresh_priority(&mut self, policy:PriorityPolicy, injection_base:i64)
	{
		self.priority = match (self.front(), policy)
		{
			(None,_) => 0,
			(Some(_),PriorityPolicy::None) => 0,
			(Some(f),PriorityPolicy::LocalAge) => injection_base - f.time as i64,
			(Some(_),PriorityPolicy::QueueLength) => self.buffer.len() as i64,
			(Some(f),PriorityPolicy::HopCount) => f.hops as i64,
			(Some(f),PriorityPolicy::Other) => f.pri,
		};
	}
}

/// Owns every VC of one router input, plus an optional shared overflow pool shared
/// across all of them.
#[derive(Debug,Clone,Quantifiable)]
pub struct Buffer
{
	pub vcs: Vec<Vc>,
	shared_size: usize,
	shared_used: usize,
}

impl Buffer
{
	pub fn new(num_vcs:usize, vc_size:usize, shared_size:usize) -> Buffer
	{
		Buffer{
			vcs: (0..num_vcs).map(|_|Vc::new(vc_size)).collect(),
			shared_size,
			shared_used: 0,
		}
	}

	pub fn num_vcs(&self) -> usize { self.vcs.len() }

	/// `full` is true iff the target VC is at `vc_size` and the shared pool is exhausted.
	pub fn full(&self, vc:usize) -> bool
	{
		self.vcs[vc].own_slots_full() && self.shared_used>=self.shared_size
	}

	/// Fatal per §7: pushing into a full VC indicates the credit protocol allowed an
	/// over-commitment.
	pub fn add_flit(&mut self, vc:usize, flit:Flit)
	{
		if self.full(vc)
		{
			panic!("fatal: VC buffer overflow at vc {} (flit {})", vc, flit.id);
		}
		if self.vcs[vc].own_slots_full()
		{
			self.shared_used += 1;
		}
		self.vcs[vc].push(flit);
	}

	pub fn remove_flit(&mut self, vc:usize) -> Option<Flit>
	{
		let was_over = self.vcs[vc].own_slots_full();
		let flit = self.vcs[vc].pop();
		if flit.is_some() && was_over && self.shared_used>0
		{
			self.shared_used -= 1;
		}
		flit
	}

	pub fn front(&self, vc:usize) -> Option<&Flit> { self.vcs[vc].front() }
	pub fn empty(&self, vc:usize) -> bool { self.vcs[vc].empty() }
	pub fn state(&self, vc:usize) -> VcState { self.vcs[vc].state }
	pub fn state_time(&self, vc:usize) -> Time { self.vcs[vc].state_time }
	pub fn set_state(&mut self, vc:usize, state:VcState) { self.vcs[vc].set_state(state); }
	pub fn set_state_keep_time(&mut self, vc:usize, state:VcState) { self.vcs[vc].set_state_keep_time(state); }
	pub fn get_route_set(&self, vc:usize) -> &OutputSet { &self.vcs[vc].route_set }
	pub fn set_route_set(&mut self, vc:usize, set:OutputSet) { self.vcs[vc].route_set = set; }
	pub fn set_output(&mut self, vc:usize, out_port:usize, out_vc:usize) { self.vcs[vc].output = Some((out_port,out_vc)); }
	pub fn output(&self, vc:usize) -> Option<(usize,usize)> { self.vcs[vc].output }

	pub fn advance_time(&mut self)
	{
		for vc in self.vcs.iter_mut() { vc.advance_time(); }
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	fn head_flit(pid:u64) -> Flit
	{
		Flit{ head:true, tail:false, pid, ..Flit::default() }
	}

	#[test]
	#[should_panic(expected = "non-head flit")]
	fn non_head_flit_into_idle_vc_is_fatal()
	{
		let mut buf = Buffer::new(1,4,0);
		let body = Flit{ head:false, tail:false, pid:1, ..Flit::default() };
		buf.add_flit(0, body);
	}

	#[test]
	#[should_panic(expected = "buffer overflow")]
	fn overflow_past_vc_and_shared_capacity_is_fatal()
	{
		let mut buf = Buffer::new(1,1,0);
		buf.add_flit(0, head_flit(1));
		buf.add_flit(0, Flit{ head:false, tail:true, pid:1, ..Flit::default() });
	}

	#[test]
	fn shared_pool_absorbs_overflow_past_vc_size()
	{
		let mut buf = Buffer::new(1,1,1);
		buf.add_flit(0, head_flit(1));
		buf.add_flit(0, Flit{ head:false, tail:true, pid:1, ..Flit::default() });
		assert_eq!(buf.vcs[0].occupancy(), 2);
	}

	#[test]
	fn route_set_and_output_clear_on_tail_departure()
	{
		let mut buf = Buffer::new(1,4,0);
		buf.add_flit(0, Flit{ head:true, tail:true, pid:9, ..Flit::default() });
		let mut set = OutputSet::new();
        set.add(0,0,0,1);
		buf.set_route_set(0, set);
		buf.set_output(0,0,0);
		buf.remove_flit(0);
		assert!(buf.get_route_set(0).is_empty());
		assert_eq!(buf.output(0), None);
	}

	#[test]
	fn priority_policy_queue_length_tracks_occupancy()
	{
		let mut vc = Vc::new(4);
		vc.push(head_flit(1));
		vc.push(Flit{ head:false, tail:false, pid:1, ..Flit::default() });
		vc.refresh_priority(PriorityPolicy::QueueLength, 0);
		assert_eq!(vc.priority, 2);
	}
}
