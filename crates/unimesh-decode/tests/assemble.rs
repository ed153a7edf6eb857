//! Whole-mesh decoding across format eras.

mod common;

use unimesh_decode::{
    Attribute, ByteOrder, DecodeError, EngineVersion, FormatInfo, MeshAssembler, Version,
    WordUnpacker, decode_mesh,
};
use unimesh_types::{
    ChannelInfo, CompressedMesh, MeshFields, PackedBitVector, StreamInfo, SubMesh, VertexData,
};

use common::{be_floats, float_vector, int_vector, le_floats, le_indices};

fn sub_mesh(index_count: u32, topology: u32) -> SubMesh {
    SubMesh {
        index_count,
        topology,
        ..SubMesh::default()
    }
}

fn channel(stream: u8, offset: u8, format: u8, dimension: u8) -> ChannelInfo {
    ChannelInfo {
        stream,
        offset,
        format,
        dimension,
    }
}

fn assert_close(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-5, "{actual:?} vs {expected:?}");
    }
}

#[test]
fn test_legacy_implicit_layout() {
    // Position, normal and color in one stream with no stored stride.
    let mut data = Vec::new();
    for v in 0..3u8 {
        data.extend(le_floats(&[f32::from(v), 0.0, 0.0]));
        data.extend(le_floats(&[0.0, 1.0, 0.0]));
        data.extend([255, 0, 51, v]);
    }
    let fields = MeshFields {
        sub_meshes: vec![sub_mesh(3, 1)],
        index_buffer: le_indices(&[0, 1, 2]),
        vertex_data: Some(VertexData {
            vertex_count: 3,
            streams_0: Some(StreamInfo {
                channel_mask: 0b111,
                offset: 0,
                stride: 0,
            }),
            data,
            ..VertexData::default()
        }),
        ..MeshFields::default()
    };

    let format = FormatInfo::new(Version::new(3, 5, 0, 0), ByteOrder::Little);
    let mesh = decode_mesh(&fields, format).unwrap();

    assert_eq!(mesh.vertex_count, 3);
    assert_close(&mesh.positions.unwrap().data, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
    assert_eq!(mesh.normals.unwrap().get(2), Some(&[0.0, 1.0, 0.0][..]));
    let colors = mesh.colors.unwrap();
    assert_eq!(colors.dimension, 4);
    assert_close(colors.get(0).unwrap(), &[1.0, 0.0, 0.2, 0.0]);
    assert_eq!(mesh.indices, vec![0, 1, 2]);
}

#[test]
fn test_unity5_two_streams_big_endian() {
    // Four vertices: positions in stream 0 (48 bytes), UV0 in stream 1.
    let positions = [
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
    ];
    let uvs = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
    let mut data = be_floats(&positions);
    data.extend(be_floats(&uvs));

    let mut channels = vec![ChannelInfo::default(); 8];
    channels[0] = channel(0, 0, 0, 3);
    channels[3] = channel(1, 0, 0, 2);

    let fields = MeshFields {
        sub_meshes: vec![sub_mesh(4, 2)],
        index_buffer: [0u16, 1, 2, 3].iter().flat_map(|i| i.to_be_bytes()).collect(),
        vertex_data: Some(VertexData {
            vertex_count: 4,
            channels,
            data,
            ..VertexData::default()
        }),
        ..MeshFields::default()
    };

    let format = FormatInfo::new(Version::new(5, 6, 0, 0), ByteOrder::Big);
    let mesh = decode_mesh(&fields, format).unwrap();

    assert_eq!(mesh.positions.as_ref().unwrap().data, positions);
    assert_eq!(mesh.uv(0).unwrap().map(|uv| uv.data.clone()), Some(uvs.to_vec()));
    assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    assert_eq!(mesh.sub_meshes[0].index_count, 6);
}

#[test]
fn test_unity2018_slots() {
    let mut data = le_floats(&[1.0, 2.0, 3.0]);
    data.extend(le_floats(&[1.0, 0.0, 0.0, -1.0]));
    // Float16 0.5 and 1.0.
    data.extend([0x00, 0x38, 0x00, 0x3C]);

    let mut channels = vec![ChannelInfo::default(); 14];
    channels[0] = channel(0, 0, 0, 3);
    channels[2] = channel(0, 12, 0, 4);
    channels[11] = channel(0, 28, 1, 2);

    let fields = MeshFields {
        vertex_data: Some(VertexData {
            vertex_count: 1,
            channels,
            data,
            ..VertexData::default()
        }),
        ..MeshFields::default()
    };

    let format = FormatInfo::new(Version::new(2018, 4, 2, 1), ByteOrder::Little);
    let mesh = decode_mesh(&fields, format).unwrap();

    assert_eq!(mesh.tangents.as_ref().unwrap().data, vec![1.0, 0.0, 0.0, -1.0]);
    assert_eq!(
        mesh.uv(7).unwrap().map(|uv| uv.data.clone()),
        Some(vec![0.5, 1.0])
    );
    assert!(mesh.uv(4).unwrap().is_none());
    assert!(mesh.uvs().all(|(index, _)| index == 7));
}

#[test]
fn test_compressed_mesh_without_vertex_data() {
    let compressed = CompressedMesh {
        // Two vertices on [0, 1].
        vertices: float_vector(&[0, 0, 0, 255, 255, 255], 8, 1.0, 0.0),
        uv: float_vector(&[0, 255, 255, 0], 8, 1.0, 0.0),
        normals: float_vector(&[0, 0, 0, 0], 1, 0.0, 0.0),
        normal_signs: int_vector(&[1, 0], 1),
        float_colors: Some(float_vector(&[255; 8], 8, 1.0, 0.0)),
        weights: int_vector(&[31, 31], 5),
        bone_indices: int_vector(&[3, 4], 4),
        triangles: int_vector(&[0, 1, 1], 2),
        ..CompressedMesh::default()
    };
    let fields = MeshFields {
        sub_meshes: vec![sub_mesh(3, 0)],
        compressed_mesh: Some(compressed),
        mesh_compression: 3,
        ..MeshFields::default()
    };

    let format = FormatInfo::new(Version::new(5, 6, 0, 0), ByteOrder::Little);
    let mesh = MeshAssembler::new(format)
        .with_unpacker(&WordUnpacker)
        .assemble(&fields)
        .unwrap();

    assert_eq!(mesh.vertex_count, 2);
    assert_eq!(mesh.positions.as_ref().unwrap().get(1), Some(&[1.0, 1.0, 1.0][..]));
    assert_eq!(mesh.uv(0).unwrap().map(Attribute::len), Some(2));
    assert!(mesh.uv(1).unwrap().is_none());
    assert_eq!(mesh.normals.unwrap().data, vec![0.0, 0.0, 1.0, 0.0, 0.0, -1.0]);
    assert_eq!(mesh.colors.unwrap().data, vec![1.0; 8]);

    let skin = mesh.skin.unwrap();
    assert_eq!(skin[0].bone_indices, [3, 0, 0, 0]);
    assert_eq!(skin[1].weights, [1.0, 0.0, 0.0, 0.0]);
    assert_eq!(mesh.indices, vec![0, 1, 1]);
}

#[test]
fn test_legacy_compressed_byte_colors_and_bind_poses() {
    let mut identity = vec![0u32; 16];
    for i in [0, 5, 10, 15] {
        identity[i] = 1;
    }
    let compressed = CompressedMesh {
        vertices: float_vector(&[0; 3], 8, 1.0, 0.0),
        bind_poses: Some(float_vector(&identity, 1, 1.0, 0.0)),
        colors: Some(PackedBitVector::ints(1, 32, vec![255, 0, 0, 255])),
        ..CompressedMesh::default()
    };
    let fields = MeshFields {
        compressed_mesh: Some(compressed),
        ..MeshFields::default()
    };

    let format = FormatInfo::new(Version::new(4, 7, 2, 0), ByteOrder::Little);
    let mesh = decode_mesh(&fields, format).unwrap();

    assert_eq!(mesh.bind_poses, vec![glam::Mat4::IDENTITY]);
    assert_eq!(mesh.colors.unwrap().data, vec![1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_patch_build_reads_32bit_indices() {
    let engine: EngineVersion = "2017.3.1p1".parse().unwrap();
    let format = FormatInfo::new(engine.version, ByteOrder::Little)
        .with_build_type(engine.build_type);

    let fields = MeshFields {
        sub_meshes: vec![sub_mesh(3, 0)],
        use_16bit_indices: 1,
        index_format: Some(1),
        mesh_compression: 1,
        index_buffer: [2u32, 1, 0].iter().flat_map(|i| i.to_le_bytes()).collect(),
        ..MeshFields::default()
    };
    let mesh = decode_mesh(&fields, format).unwrap();
    assert_eq!(mesh.indices, vec![2, 1, 0]);
}

#[test]
fn test_line_topology_fails_the_mesh() {
    let fields = MeshFields {
        sub_meshes: vec![sub_mesh(2, 3)],
        index_buffer: le_indices(&[0, 1]),
        ..MeshFields::default()
    };
    let format = FormatInfo::new(Version::new(2020, 3, 0, 0), ByteOrder::Little);
    assert_eq!(
        decode_mesh(&fields, format),
        Err(DecodeError::UnsupportedTopology(3))
    );
}
