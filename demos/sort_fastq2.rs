use r2sort::*;

fn main() {
    let fastq1 = b"@read1/1
GGGGGGGGGGGGATCACG
+
012345678901234567
@read2/1
GGGGGGGGGGGGGGGGGG
+
012345678901234567
@read3/1
NNNNNNNNNNNNNNNNNN
+
012345678901234567";
    let fastq2 = b"@read1/2
CGTGATAAAAAAAAAAAA
+
012345678901234567
@read2/2
CCCCCCAAAAAAAAAAAA
+
012345678901234567
@read3/2
NNNNNNNNNNNNNNNNNN
+
012345678901234567";

    let sorter = ReadPairSorter::from_parts("CGTGAT", Thresholds::default(), TrimFlags::default())
        .unwrap_or_else(|e| panic!("{e}"));

    let pair = || WriterPair::new(Vec::<u8>::new(), Vec::new());
    let mut outputs = SortOutputs::new(pair(), pair(), pair());
    let counts = sorter
        .sort(&mut &fastq1[..], &mut &fastq2[..], &mut outputs)
        .unwrap_or_else(|e| panic!("{e}"));

    for (dest, WriterPair { r1, r2 }) in Destination::ALL.into_iter().zip(outputs.into_pairs()) {
        println!("{dest:?} read 1:\n{}", String::from_utf8_lossy(&r1));
        println!("{dest:?} read 2:\n{}", String::from_utf8_lossy(&r2));
    }

    print!("{}", counts.report());
}
