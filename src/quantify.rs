/*!

Memory-accounting support. Every data-bearing struct in the crate derives `Quantifiable`
so that a running simulation can report how its memory is distributed across routers,
buffers and in-flight flits without needing a heap profiler.

*/

use std::mem::size_of;
use std::rc::Rc;
use std::cell::RefCell;
use std::collections::VecDeque;

pub trait Quantifiable
{
	/// Bytes currently occupied by `self`, including heap-allocated children.
	fn total_memory(&self) -> usize;
	/// Print to stdout a breakdown of where the memory goes. Mostly for interactive debugging.
	fn print_memory_breakdown(&self);
	/// An estimate of the memory a fully-populated instance of this type would use.
	fn forecast_total_memory(&self) -> usize;
}

macro_rules! quantify_as_self_size{
	($t:ty) => {
		impl Quantifiable for $t
		{
			fn total_memory(&self) -> usize { size_of::<$t>() }
			fn print_memory_breakdown(&self) { println!("{}: {}",stringify!($t),size_of::<$t>()); }
			fn forecast_total_memory(&self) -> usize { size_of::<$t>() }
		}
	}
}

quantify_as_self_size!(bool);
quantify_as_self_size!(u8);
quantify_as_self_size!(u16);
quantify_as_self_size!(u32);
quantify_as_self_size!(u64);
quantify_as_self_size!(usize);
quantify_as_self_size!(i32);
quantify_as_self_size!(i64);
quantify_as_self_size!(f32);
quantify_as_self_size!(f64);

impl<T:Quantifiable> Quantifiable for Vec<T>
{
	fn total_memory(&self) -> usize
	{
		size_of::<Self>() + self.iter().map(|x|x.total_memory()).sum::<usize>()
	}
	fn print_memory_breakdown(&self)
	{
		println!("Vec<{}> of {} elements, {} bytes total",std::any::type_name::<T>(),self.len(),self.total_memory());
	}
	fn forecast_total_memory(&self) -> usize { self.total_memory() }
}

impl<T:Quantifiable> Quantifiable for VecDeque<T>
{
	fn total_memory(&self) -> usize
	{
		size_of::<Self>() + self.iter().map(|x|x.total_memory()).sum::<usize>()
	}
	fn print_memory_breakdown(&self)
	{
		println!("VecDeque<{}> of {} elements",std::any::type_name::<T>(),self.len());
	}
	fn forecast_total_memory(&self) -> usize { self.total_memory() }
}

impl<T:Quantifiable> Quantifiable for Option<T>
{
	fn total_memory(&self) -> usize
	{
		size_of::<Self>() + self.as_ref().map(|x|x.total_memory()).unwrap_or(0)
	}
	fn print_memory_breakdown(&self)
	{
		if let Some(x)=self { x.print_memory_breakdown() }
	}
	fn forecast_total_memory(&self) -> usize { self.total_memory() }
}

impl<T:Quantifiable> Quantifiable for Rc<T>
{
	fn total_memory(&self) -> usize { size_of::<Self>() + self.as_ref().total_memory() }
	fn print_memory_breakdown(&self) { self.as_ref().print_memory_breakdown() }
	fn forecast_total_memory(&self) -> usize { self.total_memory() }
}

impl<T:Quantifiable> Quantifiable for RefCell<T>
{
	fn total_memory(&self) -> usize { size_of::<Self>() + self.borrow().total_memory() }
	fn print_memory_breakdown(&self) { self.borrow().print_memory_breakdown() }
	fn forecast_total_memory(&self) -> usize { self.total_memory() }
}

impl Quantifiable for String
{
	fn total_memory(&self) -> usize { size_of::<Self>() + self.capacity() }
	fn print_memory_breakdown(&self) { println!("String: {} bytes",self.total_memory()); }
	fn forecast_total_memory(&self) -> usize { self.total_memory() }
}
