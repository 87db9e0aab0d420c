/*!

The flow-control unit moving through the network. Traffic managers (out of scope here)
create Flits at injection and hand them to the first router's input channel; the core
only ever reads and mutates the fields documented below.

*/

use quantifiable_derive::Quantifiable;
use crate::quantify::Quantifiable;
use crate::pool::Resettable;
use crate::time::Time;

/// Traffic class a flit belongs to. Routing functions and priority policies may use this
/// to separate request/reply traffic into disjoint VC ranges for deadlock avoidance.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default)]
pub enum FlitType
{
	#[default]
	Any,
	ReadRequest,
	ReadReply,
	WriteRequest,
	WriteReply,
}

/// An opaque payload handle. The core never inspects it; traffic managers may stash a
/// handle to application data here (e.g. an index into their own message buffer).
pub type DataHandle = u64;

#[derive(Debug,Clone,Quantifiable)]
pub struct Flit
{
	/// Monotonically increasing identifier, unique among live flits.
	pub id: u64,
	/// Identifies the packet this flit belongs to; shared by every flit of the packet.
	pub pid: u64,
	/// Sequence number within the packet, `0` for the head.
	pub sn: u32,
	pub head: bool,
	pub tail: bool,
	pub flit_type: FlitType,
	/// Index of the virtual channel this flit currently occupies; rewritten on each hop.
	pub vc: usize,
	pub src: usize,
	pub dest: usize,
	/// Cycle at which the flit was injected into the network.
	pub time: Time,
	/// Number of router-to-router hops traveled so far.
	pub hops: u32,
	/// Caller-supplied priority, consulted by the `Other` priority policy.
	pub pri: i64,
	/// Debug tracing flag; when set the router may log every pipeline transition.
	pub watch: bool,
	/// Scratch field for routing functions implementing intermediate-node (e.g. Valiant) routing.
	pub intm: Option<usize>,
	/// Scratch phase counter for routing functions with multi-phase deadlock avoidance (e.g. O1Turn, Valiant).
	pub ph: u32,
	/// Scratch parity bit for ring-style routing functions.
	pub ring_par: bool,
	/// Scratch flag for dimension-ordered routing variants that route X before Y or vice versa.
	pub x_then_y: bool,
	/// Whether the routing function considers the currently cached route minimal.
	pub minimal: bool,
	pub data: Option<DataHandle>,
}

impl Default for Flit
{
	fn default() -> Flit
	{
		Flit{
			id:0, pid:0, sn:0, head:false, tail:false,
			flit_type: FlitType::Any,
			vc:0, src:0, dest:0, time:0, hops:0, pri:0, watch:false,
			intm:None, ph:0, ring_par:false, x_then_y:false, minimal:true,
			data:None,
		}
	}
}

impl Resettable for Flit
{
	fn reset(&mut self)
	{
		*self = Flit::default();
	}
}

impl Flit
{
	/// A packet of a single flit has both `head` and `tail` set.
	pub fn is_single_flit_packet(&self) -> bool
	{
		self.head && self.tail
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn single_flit_packet_is_both_head_and_tail()
	{
		let f = Flit{ head:true, tail:true, ..Flit::default() };
		assert!(f.is_single_flit_packet());
	}

	#[test]
	fn reset_clears_identity_fields()
	{
		let mut f = Flit{ id:7, pid:3, hops:5, ..Flit::default() };
		f.reset();
		assert_eq!(f.id,0);
		assert_eq!(f.pid,0);
		assert_eq!(f.hops,0);
	}
}
