/*!

Acknowledgement that one or more downstream VC slots have been freed, sent back along
the reverse of a FlitChannel on a separate, fixed-latency CreditChannel.

*/

use quantifiable_derive::Quantifiable;
use crate::quantify::Quantifiable;
use crate::pool::Resettable;

#[derive(Debug,Clone,Default,Quantifiable)]
pub struct Credit
{
	/// The set of VC indices freed at the source input since the last credit was sent.
	pub vcs: Vec<usize>,
	/// Optional tracing metadata, populated only when the freed flit(s) were `watch`ed.
	pub head: bool,
	pub tail: bool,
	pub id: Option<u64>,
}

impl Resettable for Credit
{
	fn reset(&mut self)
	{
		self.vcs.clear();
		self.head=false;
		self.tail=false;
		self.id=None;
	}
}

impl Credit
{
	pub fn for_vc(vc:usize) -> Credit
	{
		Credit{ vcs: vec![vc], ..Credit::default() }
	}
	pub fn is_empty(&self) -> bool
	{
		self.vcs.is_empty()
	}
}
