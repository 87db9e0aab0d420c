/*!

Topology construction is an external collaborator: it decides the router graph and the
per-channel latency `Network::wire` uses when building `FlitChannel`/`CreditChannel`
pairs. This module only fixes the trait boundary and `Location` addressing scheme the
core consumes; the rich topology families (k-ary n-cube, mesh, torus, dragonfly, MECS,
IsolatedMesh) live above this core and are out of scope here.

*/

use crate::quantify::Quantifiable;

/// Where a link lands: another router's port, a server, or nowhere (unconnected port).
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Location
{
	RouterPort{ router_index:usize, router_port:usize },
	ServerPort(usize),
	None,
}

pub trait Topology : std::fmt::Debug
{
	fn num_routers(&self) -> usize;
	fn num_servers(&self) -> usize;
	/// The neighbour reached by `port` of `router_index`, plus its link-class index.
	fn neighbour(&self, router_index:usize, port:usize) -> (Location,usize);
	fn server_neighbour(&self, server_index:usize) -> (Location,usize);
	fn diameter(&self) -> usize;
	fn distance(&self, origin:usize, destination:usize) -> usize;
}

/// A unidirectional ring of `n` routers, one server per router, uniform link latency.
/// Minimal enough to drive `Network` integration tests without a full topology layer.
#[derive(Debug,Clone,Quantifiable)]
pub struct Ring
{
	n: usize,
}

impl Ring
{
	pub fn new(n:usize) -> Ring
	{
		assert!(n>=2, "a ring needs at least 2 routers");
		Ring{ n }
	}
}

impl Topology for Ring
{
	fn num_routers(&self) -> usize { self.n }
	fn num_servers(&self) -> usize { self.n }
	/// port 0 = predecessor, port 1 = successor, port 2 = attached server.
	fn neighbour(&self, router_index:usize, port:usize) -> (Location,usize)
	{
		match port
		{
			0 => (Location::RouterPort{ router_index:(router_index+self.n-1)%self.n, router_port:1 }, 0),
			1 => (Location::RouterPort{ router_index:(router_index+1)%self.n, router_port:0 }, 0),
			2 => (Location::ServerPort(router_index), 1),
			_ => (Location::None, 0),
		}
	}
	fn server_neighbour(&self, server_index:usize) -> (Location,usize)
	{
		(Location::RouterPort{ router_index:server_index, router_port:2 }, 1)
	}
	fn diameter(&self) -> usize { self.n/2 }
	fn distance(&self, origin:usize, destination:usize) -> usize
	{
		let forward = (destination + self.n - origin) % self.n;
		let backward = (origin + self.n - destination) % self.n;
		forward.min(backward)
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn ring_neighbours_wrap_around()
	{
		let ring = Ring::new(4);
		assert_eq!(ring.neighbour(0,0).0, Location::RouterPort{ router_index:3, router_port:1 });
		assert_eq!(ring.neighbour(3,1).0, Location::RouterPort{ router_index:0, router_port:0 });
	}

	#[test]
	fn ring_distance_takes_the_shorter_arc()
	{
		let ring = Ring::new(8);
		assert_eq!(ring.distance(0,2), 2);
		assert_eq!(ring.distance(0,7), 1);
	}
}
