/*!

The traffic manager is an external collaborator: it decides when each server injects a
new packet, builds the Flits for it, and consumes Flits that routers eject. This module
only fixes the trait boundary; the rich traffic families (uniform, permutation, hot-spot,
collectives, mini-apps, traced sequences) live above this core and are out of scope here.

*/

use rand::Rng;
use rand::rngs::StdRng;
use crate::flit::Flit;
use crate::time::Time;

/// Produces flits for injection and accepts ejected ones. `server` indices are whatever
/// the surrounding topology assigns; the core never interprets them beyond routing `src`/`dest`.
pub trait Traffic : std::fmt::Debug
{
	/// Whether `server` wants to inject a new packet this cycle.
	fn should_generate(&mut self, server:usize, cycle:Time, rng:&mut StdRng) -> bool;
	/// Builds the flits of a newly-injected packet at `server`, head first, tail last.
	fn generate_packet(&mut self, server:usize, cycle:Time, rng:&mut StdRng) -> Vec<Flit>;
	/// Called once per ejected flit; traffics that track completion use this to retire a task.
	fn consume(&mut self, flit:&Flit, cycle:Time);
	fn is_finished(&self) -> bool;
}

/// Every server injects single-flit packets to a uniformly random distinct destination
/// with fixed per-cycle probability `load`, until `total_packets` have been generated.
#[derive(Debug)]
pub struct UniformTraffic
{
	num_servers: usize,
	load: f64,
	total_packets: u64,
	generated: u64,
	consumed: u64,
	next_id: u64,
	next_pid: u64,
}

impl UniformTraffic
{
	pub fn new(num_servers:usize, load:f64, total_packets:u64) -> UniformTraffic
	{
		UniformTraffic{ num_servers, load, total_packets, generated:0, consumed:0, next_id:0, next_pid:0 }
	}
}

impl Traffic for UniformTraffic
{
	fn should_generate(&mut self, _server:usize, _cycle:Time, rng:&mut StdRng) -> bool
	{
		self.generated < self.total_packets && rng.gen_bool(self.load.clamp(0.0,1.0))
	}

	fn generate_packet(&mut self, server:usize, cycle:Time, rng:&mut StdRng) -> Vec<Flit>
	{
		let dest = loop
		{
			let candidate = rng.gen_range(0..self.num_servers);
			if candidate != server || self.num_servers==1 { break candidate; }
		};
		let pid = self.next_pid;
		self.next_pid += 1;
		self.generated += 1;
		let id = self.next_id;
		self.next_id += 1;
		vec![Flit{ id, pid, sn:0, head:true, tail:true, src:server, dest, time:cycle, ..Flit::default() }]
	}

	fn consume(&mut self, _flit:&Flit, _cycle:Time)
	{
		self.consumed += 1;
	}

	fn is_finished(&self) -> bool
	{
		self.generated >= self.total_packets && self.consumed >= self.generated
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn stops_generating_after_total_packets()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut traffic = UniformTraffic::new(4,1.0,2);
		assert!(traffic.should_generate(0,0,&mut rng));
		let _ = traffic.generate_packet(0,0,&mut rng);
		assert!(traffic.should_generate(1,1,&mut rng));
		let _ = traffic.generate_packet(1,1,&mut rng);
		assert!(!traffic.should_generate(2,2,&mut rng));
	}

	#[test]
	fn finishes_once_every_generated_packet_is_consumed()
	{
		let mut rng = rand::SeedableRng::seed_from_u64(1);
		let mut traffic = UniformTraffic::new(4,1.0,1);
		assert!(traffic.should_generate(0,0,&mut rng));
		let flits = traffic.generate_packet(0,0,&mut rng);
		assert!(!traffic.is_finished());
		traffic.consume(&flits[0],1);
		assert!(traffic.is_finished());
	}
}
