// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Writers for the `.srr` instance format.

use crate::costs::CostTensor;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Writes `costs` in the `.srr` format read by `InstanceLoader`.
///
/// The first line is the team count, followed by one `i j r cost` line for
/// every non-zero entry. Both orderings of a pair are written.
pub fn write_instance<W: Write>(costs: &CostTensor, mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "{}", costs.num_teams())?;
    for (m, round, cost) in costs.cells() {
        if cost == 0.0 {
            continue;
        }
        let (i, j, r) = (m.first().get(), m.second().get(), round.get());
        writeln!(writer, "{:3} {:3} {:3} {:.6}", i, j, r, cost)?;
        writeln!(writer, "{:3} {:3} {:3} {:.6}", j, i, r, cost)?;
    }
    writer.flush()
}

/// Writes `costs` to a new file at `path`, replacing an existing one.
pub fn write_instance_to_path<P: AsRef<Path>>(costs: &CostTensor, path: P) -> std::io::Result<()> {
    let file = File::create(path)?;
    write_instance(costs, BufWriter::new(file))
}

/// Returns the conventional file name of a sampled instance.
///
/// ```rust
/// use fixture_model::writing::instance_file_name;
///
/// assert_eq!(instance_file_name(8, 0.25, 3), "bin008_025_003.srr");
/// assert_eq!(instance_file_name(20, 0.07, 12), "bin020_007_012.srr");
/// ```
pub fn instance_file_name(num_teams: usize, ratio: f64, seed: u64) -> String {
    let percent = (ratio * 100.0).round() as u64;
    format!("bin{:03}_{:03}_{:03}.srr", num_teams, percent, seed)
}
