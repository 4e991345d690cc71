use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{thread_rng, Rng};
use rezmax_proxy::normalize::{search, seat_map};
use rezmax_proxy::{AdapterConfig, ResponseTree};

// Seat map with `rows` rows of four seats, random occupancy
fn seat_map_xml(rows: usize) -> String {
    let mut rng = thread_rng();
    let mut xml = String::from("<REZMax_GetBusSeatsRS><Success/><Bus><Seats>");
    for row in 0..rows {
        xml.push_str("<Row>");
        for col in 0..4 {
            xml.push_str(&format!(
                r#"<Seat N="{}" O="{}"/>"#,
                row * 4 + col + 1,
                u8::from(rng.gen_bool(0.4))
            ));
        }
        xml.push_str("</Row>");
    }
    xml.push_str("</Seats></Bus></REZMax_GetBusSeatsRS>");
    xml
}

fn bus_avail_xml(options: usize) -> String {
    let mut rng = thread_rng();
    let mut xml = String::from(
        "<REZMax_getBusAvailRS><Success/><OriginDestinationInformation><Options>",
    );
    for i in 0..options {
        let hour = rng.gen_range(5..22);
        xml.push_str(&format!(
            r#"<Option OptionId="OPT-{i}"><Segment DepartureDateTime="2025-06-01T{hour:02}:00:00" ArrivalDateTime="2025-06-01T{arr:02}:30:00"><MarketingBusline><CompanyName>Carrier {i}</CompanyName></MarketingBusline><TicketAvail PassengerType="ADT" Price="{adult}.00" Currency="RON"/><TicketAvail PassengerType="*" Price="{any}.50" Currency="RON"/></Segment></Option>"#,
            i = i,
            hour = hour,
            arr = hour + 2,
            adult = rng.gen_range(40..120),
            any = rng.gen_range(40..120),
        ));
    }
    xml.push_str("</Options></OriginDestinationInformation></REZMax_getBusAvailRS>");
    xml
}

pub fn seat_map_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("seat_map_normalize");

    for rows in [10, 20, 50].iter() {
        let xml = seat_map_xml(*rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &xml, |b, xml| {
            b.iter(|| {
                let tree = ResponseTree::parse(black_box(xml)).unwrap();
                seat_map::normalize(&tree).unwrap()
            })
        });
    }

    group.finish();
}

pub fn search_benchmark(c: &mut Criterion) {
    let config = AdapterConfig::default();
    let mut group = c.benchmark_group("search_normalize");

    for options in [5, 50, 200].iter() {
        let xml = bus_avail_xml(*options);
        group.bench_with_input(BenchmarkId::from_parameter(options), &xml, |b, xml| {
            b.iter(|| {
                let tree = ResponseTree::parse(black_box(xml)).unwrap();
                search::normalize(&tree, &config).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, seat_map_benchmark, search_benchmark);
criterion_main!(benches);
