//! Known status codes.
//!
//! Static data only. A code missing from these tables still resolves
//! through its severity level.

use super::Severity;

/// `(code, kind, severity)` for every code with a dedicated kind.
pub(super) const KNOWN_CODES: &[(&str, &str, Severity)] = &[
    ("MCL_TIMEOUT", "MCLTimeout", Severity::Runtime),
    ("VOLUME_IS_MASTER", "VolumeMaster", Severity::Runtime),
    ("PARTIAL_SUCCESS", "PartialSuccess", Severity::Runtime),
    ("TRNS_ERROR_WITH_EXTENDED_INFO", "OperationFailedWithExtendedInfo", Severity::Runtime),
    ("VOLUME_BAD_NAME", "VolumeBadName", Severity::Runtime),
    ("SOURCE_VOLUME_BAD_NAME", "SourceVolumeBadName", Severity::Runtime),
    ("TARGET_VOLUME_BAD_NAME", "TargetVolumeBadName", Severity::Runtime),
    ("BASE_VOLUME_BAD_NAME", "BaseVolumeBadName", Severity::Runtime),
    ("BASE_VOLUME_INVALID", "BaseVolumeInvalid", Severity::Runtime),
    ("VOLUME_EXISTS", "VolumeExists", Severity::Runtime),
    ("VOLUME_IS_MAPPED", "VolumeIsMapped", Severity::Runtime),
    ("VOLUME_SIZE_ABOVE_LIMIT", "VolumeSizeAboveLimit", Severity::Runtime),
    ("VOLUME_NO_MIRROR", "VolumeHasNoMirror", Severity::Runtime),
    ("VOLUME_HAS_DATA_MIGRATION", "VolumeHasDataMigration", Severity::Runtime),
    ("VOLUME_BELONGS_TO_MIRRORED_CONS_GROUP", "VolumeIsPartOfMirroredCg", Severity::Runtime),
    ("ALU_BAD_NAME", "ALUBadName", Severity::Runtime),
    ("CONS_GROUP_BAD_NAME", "CgBadName", Severity::Runtime),
    ("CONS_GROUP_NO_MIRROR", "CgHasNoMirror", Severity::Runtime),
    ("MIRROR_IS_NOT_SYNCHRONIZED", "MirrorNotSynchronized", Severity::Runtime),
    ("MIRROR_IS_ASYNC", "MirrorIsAsync", Severity::Runtime),
    ("MIRROR_IS_INITIAL", "MirrorInitializing", Severity::Runtime),
    ("MIRROR_IS_ACTIVE", "MirrorActive", Severity::Runtime),
    ("SYNC_ALREADY_INACTIVE", "SyncAlreadyInactive", Severity::Runtime),
    ("SYNC_ALREADY_ACTIVE", "SyncAlreadyActive", Severity::Runtime),
    ("MIRROR_IS_NON_OPERATIONAL", "MirrorNonOperational", Severity::Runtime),
    ("REMOTE_TARGET_NOT_CONNECTED", "RemoteTargetNotConnected", Severity::Runtime),
    ("LOCAL_PEER_IS_NOT_MASTER", "LocalIsNotMaster", Severity::Runtime),
    ("NOT_ENOUGH_SPACE", "PoolOutOfSpace", Severity::Runtime),
    ("NOT_ENOUGH_HARD_SPACE", "PoolOutOfHardSpace", Severity::Runtime),
    ("NOT_ENOUGH_SNAPSHOT_SPACE", "PoolOutOfSnapshotSpace", Severity::Runtime),
    ("NO_SPACE", "SystemOutOfSpace", Severity::Runtime),
    ("NOT_ENOUGH_SPACE_ON_REMOTE_MACHINE", "RemotePoolOutOfSpace", Severity::Runtime),
    ("VOLUME_IS_SNAPSHOT", "OperationNotPermittedOnSnapshot", Severity::Runtime),
    ("BAD_PARAMS", "BadParameter", Severity::Runtime),
    ("HOST_NAME_EXISTS", "HostNameAlreadyExists", Severity::Runtime),
    ("HOST_PORT_EXISTS", "HostWithPortIdAlreadyDefined", Severity::Runtime),
    ("POOL_DOES_NOT_EXIST", "PoolDoesNotExist", Severity::Runtime),
    ("POOL_SNAPSHOT_LIMIT_REACHED", "PoolSnapshotLimitReached", Severity::Runtime),
    ("REMOTE_VOLUME_IS_MASTER", "RemoteVolumeIsMaster", Severity::Runtime),
    ("CONF_PATH_DOES_NOT_EXIST", "PathDoesNotExistInConfiguration", Severity::Runtime),
    ("ILLEGAL_VALUE", "IllegalValueForArgument", Severity::Syntax),
    ("ILLEGAL_NAME", "IllegalNameForObject", Severity::Syntax),
    ("COMPONENT_TYPE_MUST_HAVE_COMPONENT_ID", "ComponentTypeMustHaveComponentID", Severity::Runtime),
    ("HOST_PROFILE_UPDATE_TOO_FREQUENT", "HostProfileUpdateTooFrequent", Severity::Runtime),
    ("HOST_BAD_NAME", "HostBadName", Severity::Runtime),
    ("CLUSTER_BAD_NAME", "ClusterBadName", Severity::Runtime),
    ("MAX_HOST_PROFILES_REACHED", "MaxHostProfilesReached", Severity::Runtime),
    ("SSD_CACHING_NOT_ENABLED", "SSDCachingNotEnabled", Severity::Runtime),
    ("UNRECOGNIZED_EVENT_CODE", "UnrecognizedEventCode", Severity::Syntax),
    ("UNRECOGNIZED_COMMAND", "UnrecognizedCommand", Severity::Syntax),
    ("CAN_NOT_SHRINK_VOLUME", "VolumeSizeCannotBeDecreased", Severity::Runtime),
    ("OBJECT_BAD_NAME", "ReferencedObjectDoesNotExist", Severity::Runtime),
    ("OPERATION_FORBIDDEN_FOR_USER_CATEGORY", "OperationForbiddenForUserCategory", Severity::Runtime),
    ("ACCESS_DENIED", "AccessDenied", Severity::Runtime),
    ("COMMAND_NOT_SUPPORTED_FOR_OLVM_VOLUMES", "CommandNotSupportedForOLVMVolumes", Severity::Runtime),
    ("VOLUME_LOCKED", "VolumeLocked", Severity::Runtime),
    ("VOLUME_HAS_OLVM", "VolumeHasOlvm", Severity::Runtime),
    ("VOLUME_HAS_MIRROR", "VolumeHasMirror", Severity::Runtime),
    ("VOLUME_BELONGS_TO_CG", "VolumeBelongsToCG", Severity::Runtime),
    ("STATUS_METADATA_SERVICE_MAX_DB_REACHED", "MetadataServiceMaxDBReached", Severity::Runtime),
    ("STATUS_METADATA_SERVICE_DB_DOES_NOT_EXIST", "MetadataServiceDBDoesNotExist", Severity::Runtime),
    ("STATUS_METADATA_SERVICE_DB_ALREADY_EXISTS", "MetadataServiceDBAlreadyExists", Severity::Runtime),
    ("STATUS_METADATA_SERVICE_KEY_DOES_NOT_EXIST", "MetadataServiceKeyDoesNotExist", Severity::Runtime),
    ("STATUS_METADATA_SERVICE_KEY_ALREADY_EXISTS", "MetadataServiceKeyAlreadyExists", Severity::Runtime),
    ("STATUS_METADATA_SERVICE_MAX_ENTRIES_REACHED", "MetadataServiceMaxEntriesReached", Severity::Runtime),
    ("STATUS_METADATA_SERVICE_INVALID_TOKEN", "MetadataServiceInvalidToken", Severity::Runtime),
    ("LDAP_AUTHENTICATION_IS_NOT_ACTIVE", "LDAPAuthenticationIsNotActive", Severity::Runtime),
    ("LDAP_IS_NOT_FULLY_CONFIGURED", "LDAPIsNotFullyConfigured", Severity::Runtime),
    ("VOLUME_INCOMPATIBLE_SIZE", "VolumeIncompatibleSize", Severity::Runtime),
    ("COMPRESSION_DISABLED", "CompressionDisabled", Severity::Runtime),
    ("COMPRESSION_REQUIRES_THIN_PROVISIONED_POOL", "CompressionRequiresThinPool", Severity::Runtime),
    ("COMPRESSED_VOLUMES_LIMIT_REACHED", "CompressedVolumesLimitReached", Severity::Runtime),
    ("COMPRESSED_CAPACITY_LIMIT_REACHED", "CompressedCapacityLimitReached", Severity::Runtime),
    ("COMPRESSED_VOLUME_TOO_BIG", "CompressedVolumeTooBig", Severity::Runtime),
    ("COMPRESSED_VOLUME_TOO_SMALL", "CompressedVolumeTooSmall", Severity::Runtime),
    ("SOURCE_VOLUME_COMPRESSED_TARGET_UNCOMPRESSED", "SourceVolumeCompressedTargetUncompressed", Severity::Runtime),
    ("SOURCE_VOLUME_UNCOMPRESSED_TARGET_COMPRESSED", "SourceVolumeUncompressedTargetCompressed", Severity::Runtime),
    ("CANNOT_SHRINK_COMPRESSED_VOLUME", "CannotShrinkCompressedVolume", Severity::Runtime),
    ("VOLUME_HAS_TRANSFORM", "VolumeHasTransform", Severity::Runtime),
    ("VOLUME_IS_COMPRESSED", "VolumeIsCompressed", Severity::Runtime),
    ("COMPRESSED_VOLUME_IS_MAPPED", "CompressedVolumeIsMapped", Severity::Runtime),
    ("CAN_NOT_MAP_SLAVE_COMPRESSED_VOLUME", "CannotMapSlave", Severity::Runtime),
    ("CONS_GROUP_NAME_EXISTS", "CgNameExists", Severity::Runtime),
    ("CONS_GROUP_DOES_NOT_EXIST", "CgDoesNotExist", Severity::Runtime),
    ("MAX_CONS_GROUPS_REACHED", "CgLimitReached", Severity::Runtime),
    ("CONS_GROUP_HAS_MIRROR", "CgHasMirror", Severity::Runtime),
    ("CONS_GROUP_NOT_EMPTY", "CgNotEmpty", Severity::Runtime),
    ("CONS_GROUP_EMPTY", "CgEmpty", Severity::Runtime),
    ("CONS_GROUP_MISMATCH", "CgMismatch", Severity::Runtime),
    ("CONS_GROUP_MIRROR_PARAMS_MISMATCH", "CgMirrorParamsMismatch", Severity::Runtime),
    ("CONS_GROUP_MIRRORING_NOT_SUPPORTED_IN_TARGET", "CgMirroringNotSupportedOnTarget", Severity::Runtime),
    ("SNAPSHOT_GROUP_BAD_NAME", "SnapshotGroupDoesNotExist", Severity::Runtime),
    ("SNAPSHOT_IS_MAPPED", "SnapshotIsMapped", Severity::Runtime),
    ("SNAPSHOT_HAS_ACTIVE_SYNC_JOB", "SnapshotIsSynchronising", Severity::Runtime),
    ("MAX_VOLUMES_REACHED", "MaxVolumesReached", Severity::Runtime),
    ("DOMAIN_MAX_VOLUMES_REACHED", "DomainMaxVolumesReached", Severity::Runtime),
    ("SNAPSHOT_GROUP_BAD_PREFIX", "SnapshotGroupIsReserved", Severity::Runtime),
    ("SNAPSHOT_GROUP_NAME_EXISTS", "SnapshotGroupAlreadyExists", Severity::Runtime),
    ("OVERWRITE_SNAPSHOT_GROUP_DOES_NOT_BELONG_TO_GIVEN_GROUP", "SnapshotGroupMismatch", Severity::Runtime),
    ("VOLUME_NOT_CONNECTED_TO_ANY_PERF_CLASS", "VolumeNotConnectedToPerfClass", Severity::Runtime),
    ("PERF_CLASS_BAD_NAME", "PerfClassNotExists", Severity::Runtime),
    ("VOLUME_ALREADY_IN_PERF_CLASS", "VolumeAlreadyInPerfClass", Severity::Runtime),
    ("PERF_CLASS_ASSOCIATED_WITH_HOSTS", "PerfClassAssociatedWithHost", Severity::Runtime),
    ("PERF_CLASS_ASSOCIATED_WITH_POOLS_OR_DOMAINS", "PerfClassAssociatedWithPoolsOrDomains", Severity::Runtime),
    ("PERF_CLASS_ASSOCIATED_WITH_VOLUMES", "PerfClassAssociatedWithVolumes", Severity::Runtime),
    ("CONS_GROUP_IS_SLAVE", "ConsGroupIsSlave", Severity::Runtime),
    ("MAX_VOLUMES_IN_CONS_GROUP_REACHED", "MaxVolumesInConsGroupReached", Severity::Runtime),
    ("MAX_VOLUMES_IN_REMOTE_CONS_GROUP_REACHED", "MaxVolumesInRemoteConsGroupReached", Severity::Runtime),
    ("REMOTE_VOLUME_BAD_POOL", "RemoteVolumeBadPool", Severity::Runtime),
    ("REMOTE_VOLUME_BELONGS_TO_CONS_GROUP", "RemoteVolumeBelongsToConsGroup", Severity::Runtime),
    ("VOLUME_BAD_POOL", "VolumeBadPool", Severity::Runtime),
    ("VOLUME_NOT_IN_CONS_GROUP", "VolumeNotInConsGroup", Severity::Runtime),
    ("REMOTE_MAX_VOLUMES_REACHED", "RemoteMaxVolumesReached", Severity::Runtime),
    ("REMOTE_VOLUME_EXISTS", "RemoteVolumeExists", Severity::Runtime),
    ("VOLUME_IS_SLAVE", "VolumeIsSlave", Severity::Runtime),
];

/// Codes reported when the array rejects the supplied credentials.
pub(super) const CREDENTIALS_CODES: &[&str] = &[
    "LOGIN_FAILURE_USER_FAILED_TO_LOGIN",
    "USER_NAME_DOES_NOT_EXIST",
    "DEFAULT_USER_IS_NOT_DEFINED",
    "INCORRECT_PASSWORD",
    "USER_OR_PASSWORD_WRONG_OR_MISSING",
    "LOGIN_FAILURE_USER_NOT_FOUND_IN_LDAP_SERVERS",
    "LOGIN_FAILURE_USER_NOT_AUTHENTICATED_BY_LDAP_SERVER",
];
