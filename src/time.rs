/*!

The global cycle counter and a couple of helpers surviving from the event-queue era of
this codebase that are still useful once the simulator moved to a plain tick loop.

*/

/// An amount of cycles.
pub type Time = u64;

/**
 Find the lowest number which is strictly greater than the input `x` and multiple of `divisor`.
**/
pub fn next_multiple(x:Time, divisor:Time) -> Time
{
	x - x.rem_euclid(divisor) + divisor
}

/**
 Find the lowest number which is greater or equal to the input `x` and multiple of `divisor`.
**/
pub fn round_to_multiple(x:Time, divisor:Time) -> Time
{
	next_multiple(x-1,divisor)
}

#[cfg(test)]
mod tests
{
	use super::*;
	#[test]
	fn multiples()
	{
		assert_eq!( next_multiple(10,5) , 15 );
		assert_eq!( next_multiple(2,5) , 5 );
		assert_eq!( round_to_multiple(10,5) , 10 );
		assert_eq!( round_to_multiple(12,5) , 15 );
	}
}
