/*!

A wire modeled as a fixed-length pipeline. `Channel<T>` is generic over the payload
(`Flit` for the data plane, `Credit` for the reverse acknowledgement plane); `FlitChannel`
and `CreditChannel` below are the two instantiations the router actually talks to.

*/

use std::collections::VecDeque;
use quantifiable_derive::Quantifiable;
use crate::quantify::Quantifiable;

/// A fixed-length FIFO pipeline of `Option<T>` slots. Invariant: `queue.len()==latency`
/// after every tick.
#[derive(Debug,Quantifiable)]
pub struct Channel<T>
{
	queue: VecDeque<Option<T>>,
	latency: usize,
}

impl<T> Channel<T>
{
	/// Builds a channel already primed for `latency` cycles of initial flight time, i.e.
	/// the first real `send` will not be observable by `receive` until `latency` ticks
	/// later.
	pub fn new(latency:usize) -> Channel<T>
	{
		assert!(latency>=1, "channel latency must be at least 1 cycle");
		let mut queue = VecDeque::with_capacity(latency);
		for _ in 0..latency { queue.push_back(None); }
		Channel{ queue, latency }
	}

	/// Resets the pipeline to empty and (re)applies `latency`. Used when a topology
	/// rebuilds channels without reallocating them.
	pub fn set_latency(&mut self, latency:usize)
	{
		assert!(latency>=1, "channel latency must be at least 1 cycle");
		self.latency = latency;
		self.queue.clear();
		for _ in 0..latency { self.queue.push_back(None); }
	}

	pub fn latency(&self) -> usize { self.latency }

	/// Pushes `item` into the entry end of the pipeline. Together with exactly one
	/// matching `receive` call at the exit end, this shifts the delay line by one slot
	/// per tick. Must be called exactly once per tick, even when `item` is `None`, or
	/// the pipeline length invariant breaks.
	pub fn send(&mut self, item:Option<T>)
	{
		self.queue.push_back(item);
	}

	/// Pops and returns the slot that has spent `latency` ticks in the pipeline.
	pub fn receive(&mut self) -> Option<T>
	{
		self.queue.pop_front().flatten()
	}

	/// Returns the front of the pipeline without consuming it.
	pub fn peek(&self) -> Option<&T>
	{
		self.queue.front().and_then(|slot|slot.as_ref())
	}

	pub fn is_idle(&self) -> bool
	{
		self.peek().is_none()
	}
}

/// A `Channel<Flit>` tagged with the routers it connects, plus per-class activity
/// counters used for link-utilization statistics (see `measures.rs`).
#[derive(Debug,Quantifiable)]
pub struct FlitChannel
{
	pub channel: Channel<crate::flit::Flit>,
	pub source_router: usize,
	pub source_port: usize,
	pub sink_router: usize,
	pub sink_port: usize,
	/// Total cycles on which a flit traversed this channel, for utilization reporting.
	pub active_cycles: u64,
	/// Whether this channel has been marked faulty; routing functions must consult this
	/// through `Router::is_faulty_output` and avoid such ports. The channel and router
	/// never filter traffic themselves.
	pub faulty: bool,
}

impl FlitChannel
{
	pub fn new(latency:usize, source_router:usize, source_port:usize, sink_router:usize, sink_port:usize) -> FlitChannel
	{
		FlitChannel{
			channel: Channel::new(latency),
			source_router, source_port, sink_router, sink_port,
			active_cycles: 0,
			faulty: false,
		}
	}
	pub fn send(&mut self, flit:Option<crate::flit::Flit>)
	{
		if flit.is_some() { self.active_cycles+=1; }
		self.channel.send(flit);
	}
	pub fn receive(&mut self) -> Option<crate::flit::Flit> { self.channel.receive() }
	pub fn peek(&self) -> Option<&crate::flit::Flit> { self.channel.peek() }
}

/// A `Channel<Credit>` running in the opposite direction of its paired `FlitChannel`,
/// with its own independently-configured `credit_delay`.
#[derive(Debug,Quantifiable)]
pub struct CreditChannel
{
	pub channel: Channel<crate::credit::Credit>,
}

impl CreditChannel
{
	pub fn new(latency:usize) -> CreditChannel
	{
		CreditChannel{ channel: Channel::new(latency) }
	}
	pub fn send(&mut self, credit:Option<crate::credit::Credit>) { self.channel.send(credit); }
	pub fn receive(&mut self) -> Option<crate::credit::Credit> { self.channel.receive() }
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn length_invariant_holds_across_ticks()
	{
		let mut c : Channel<u32> = Channel::new(3);
		for i in 0..10
		{
			c.send(Some(i));
			c.receive();
			assert_eq!(c.queue.len(), 3);
		}
	}

	/// P5: an item sent at tick T is observable no earlier and no later than tick T+L.
	#[test]
	fn item_surfaces_exactly_after_latency_ticks()
	{
		let latency = 4;
		let mut c : Channel<u32> = Channel::new(latency);
		// One send + one receive per tick, starting with the injection tick.
		for i in 0..latency
		{
			c.send(if i==0 { Some(42) } else { None });
			assert_eq!(c.receive(), None);
		}
		c.send(None);
		assert_eq!(c.receive(), Some(42));
	}

	#[test]
	fn peek_does_not_consume()
	{
		let mut c : Channel<u32> = Channel::new(1);
		c.send(Some(7));
		assert_eq!(c.peek(), Some(&7));
		assert_eq!(c.peek(), Some(&7));
		assert_eq!(c.receive(), Some(7));
	}

	#[test]
	fn idle_channel_refills_with_none()
	{
		let mut c : Channel<u32> = Channel::new(2);
		assert!(c.is_idle());
		c.send(None);
		assert!(c.is_idle());
	}
}
